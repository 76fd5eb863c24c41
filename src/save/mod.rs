mod bridge;
mod codec;
mod model;

pub use bridge::{RestoreReport, apply_save_data, save_data_from_simulation};
pub use codec::{
    export_simulation, export_to_base64, import_from_base64, import_simulation,
    load_from_json_string, save_to_json_string, save_to_pretty_json_string,
};
pub use model::{SAVE_VERSION, SaveComponent, SaveData, SaveStore};

#[cfg(test)]
mod tests {
    use super::{
        SAVE_VERSION, SaveComponent, SaveData, SaveStore, apply_save_data, export_simulation,
        export_to_base64, import_from_base64, import_simulation, load_from_json_string,
        save_data_from_simulation, save_to_json_string, save_to_pretty_json_string,
    };
    use crate::core::{SUBSPACE_EXPANSION_UPGRADE, Simulation, UpgradeManager};
    use crate::data::parse_upgrade_data;
    use crate::model::GridCoord;

    fn sample_save() -> SaveData {
        SaveData {
            version: SAVE_VERSION,
            store: SaveStore {
                money: 1234.5,
                total_money: 3456.7,
                money_earned_this_game: 2222.2,
                power: 111.0,
                total_power_produced: 999.9,
                power_produced_this_game: 888.8,
                heat: 12.3,
                total_heat_dissipated: 45.6,
                heat_dissipated_this_game: 7.8,
                exotic_particles: 3.0,
                total_exotic_particles: 10.0,
            },
            upgrade_levels: vec![1, 0, 2, 4],
            reactor_heat: 12.0,
            stored_power: 77.0,
            depleted_protium_count: 5,
            paused: true,
            replace_mode: false,
            total_ticks: 42,
            prestige_level: 2,
            shop_page: 1,
            selected_component_index: 7,
            components: vec![
                SaveComponent {
                    name: "Fuel1-1".to_string(),
                    heat: 1.5,
                    durability: 13.0,
                    depleted: false,
                    x: 2,
                    y: 3,
                    z: 0,
                },
                SaveComponent {
                    name: "Vent1".to_string(),
                    heat: 0.1,
                    durability: 0.0,
                    depleted: false,
                    x: 1,
                    y: 0,
                    z: 0,
                },
            ],
        }
    }

    fn subspace_simulation() -> Simulation {
        let file = parse_upgrade_data(&format!(
            r#"{{"upgrades": [
                {{"index": 0, "name": "Chronometer", "base_cost": 10, "cost_multiplier": 10}},
                {{"index": {SUBSPACE_EXPANSION_UPGRADE}, "name": "Subspace Expansion",
                  "base_cost": 1, "cost_multiplier": 2, "is_prestige": true}}
            ]}}"#
        ))
        .expect("upgrade data should parse");
        let mut sim = Simulation::default();
        sim.upgrades = UpgradeManager::from_data(&file);
        sim
    }

    #[test]
    fn save_json_round_trip() {
        let original = sample_save();
        let json = save_to_json_string(&original).expect("save JSON should serialize");
        let restored = load_from_json_string(&json).expect("save JSON should deserialize");
        assert_eq!(restored, original);

        let pretty = save_to_pretty_json_string(&original).expect("pretty JSON should serialize");
        assert!(pretty.contains('\n'));
        assert_eq!(load_from_json_string(&pretty).expect("pretty JSON parses"), original);
    }

    #[test]
    fn base64_import_ignores_line_breaks() {
        let original = sample_save();
        let encoded = export_to_base64(&original).expect("save should export to base64");
        let wrapped: String = encoded
            .as_bytes()
            .chunks(20)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("\n");
        let restored = import_from_base64(&wrapped).expect("save should import from base64");

        assert_eq!(restored, original);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let restored = load_from_json_string(r#"{"store": {"money": 5.0}}"#)
            .expect("partial save should deserialize");

        assert_eq!(restored.store.money, 5.0);
        assert_eq!(restored.version, SAVE_VERSION);
        assert!(restored.replace_mode);
        assert_eq!(restored.selected_component_index, -1);
        assert!(restored.components.is_empty());
    }

    #[test]
    fn garbage_import_is_an_error() {
        assert!(import_from_base64("not base64 at all!").is_err());
        assert!(load_from_json_string("{").is_err());
    }

    #[test]
    fn simulation_bridge_round_trip() {
        let mut sim = Simulation::default();
        let uranium = sim.catalog.get("Fuel1-1").expect("uranium").clone();
        sim.place_component(GridCoord::new(2, 3, 0), &uranium)
            .expect("should place component");
        sim.resources.money = 222.0;
        sim.reactor_heat = 4.5;
        sim.stored_power = 10.0;
        sim.shop_page = 1;
        sim.selected_component_index = Some(3);
        if let Some(component) = sim.component_at_mut(GridCoord::new(2, 3, 0)) {
            component.heat = 3.25;
            component.durability = 7.0;
        }

        let save = save_data_from_simulation(&sim);
        assert_eq!(save.selected_component_index, 3);
        let mut restored = Simulation::default();
        let report = apply_save_data(&mut restored, &save).expect("save apply should succeed");

        assert!(report.is_clean());
        assert_eq!(report.restored_components, 1);
        assert_eq!(restored.resources.money, 222.0);
        assert_eq!(restored.reactor_heat, 4.5);
        assert_eq!(restored.stored_power, 10.0);
        assert_eq!(restored.shop_page, 1);
        assert_eq!(restored.selected_component_index, Some(3));
        let component = restored
            .component_at(GridCoord::new(2, 3, 0))
            .expect("component should exist");
        assert_eq!(component.name(), "Fuel1-1");
        assert!((component.heat - 3.25).abs() <= f64::EPSILON);
        assert!((component.durability - 7.0).abs() <= f64::EPSILON);
        assert_eq!(save_data_from_simulation(&restored).components, save.components);
    }

    #[test]
    fn restore_skips_unknown_and_out_of_bounds_entries() {
        let mut save = sample_save();
        save.components.push(SaveComponent {
            name: "Flux Capacitor".to_string(),
            ..SaveComponent::default()
        });
        save.components.push(SaveComponent {
            name: "Vent2".to_string(),
            x: 400,
            ..SaveComponent::default()
        });
        save.components.push(SaveComponent {
            name: "Vent2".to_string(),
            x: -1,
            ..SaveComponent::default()
        });

        let mut sim = Simulation::default();
        let report = apply_save_data(&mut sim, &save).expect("save apply should succeed");

        assert_eq!(report.restored_components, 2);
        assert_eq!(report.unknown_components, vec!["Flux Capacitor".to_string()]);
        assert_eq!(report.out_of_bounds, vec![(400, 0, 0), (-1, 0, 0)]);
        // The default simulation has no upgrades, so every non-zero level is reported.
        assert_eq!(report.unknown_upgrades, vec![0, 2, 3]);
        assert_eq!(sim.components().len(), 2);
        assert!(sim.paused);
        assert!(!sim.replace_mode);
        assert_eq!(sim.tick_index, 42);
        assert_eq!(sim.prestige_level, 2);
    }

    #[test]
    fn restore_accepts_alternate_plating_spelling() {
        let mut save = SaveData::default();
        save.components.push(SaveComponent {
            name: "Plating2.png".to_string(),
            ..SaveComponent::default()
        });

        let mut sim = Simulation::default();
        let report = apply_save_data(&mut sim, &save).expect("save apply should succeed");
        assert!(report.is_clean());
        let plate = sim
            .component_at(GridCoord::new(0, 0, 0))
            .expect("plating restored");
        assert_eq!(plate.name(), "Plate2");
    }

    #[test]
    fn restore_grows_the_grid_before_placing_components() {
        let mut sim = subspace_simulation();
        sim.upgrades.set_level(SUBSPACE_EXPANSION_UPGRADE, 2);
        sim.resize_grid_for_subspace();
        let vent = sim.catalog.get("Vent1").expect("vent").clone();
        let far_corner = GridCoord::new(20, 17, 0);
        sim.place_component(far_corner, &vent).expect("fits after expansion");
        let encoded = export_simulation(&sim).expect("export");

        let mut restored = subspace_simulation();
        let report = import_simulation(&mut restored, &encoded).expect("import");

        assert!(report.is_clean());
        assert_eq!(restored.grid().width, 21);
        assert_eq!(restored.grid().height, 18);
        assert!(restored.component_at(far_corner).is_some());
    }

    #[test]
    fn depleted_flag_follows_spent_durability() {
        let mut save = SaveData::default();
        save.components.push(SaveComponent {
            name: "Fuel1-1".to_string(),
            durability: 0.0,
            ..SaveComponent::default()
        });
        save.components.push(SaveComponent {
            name: "Vent1".to_string(),
            x: 1,
            durability: 0.0,
            ..SaveComponent::default()
        });

        let mut sim = Simulation::default();
        apply_save_data(&mut sim, &save).expect("save apply should succeed");
        let fuel = sim.component_at(GridCoord::new(0, 0, 0)).expect("fuel");
        let vent = sim.component_at(GridCoord::new(1, 0, 0)).expect("vent");
        assert!(fuel.depleted);
        assert!(!vent.depleted);
    }

    #[test]
    fn newer_save_versions_are_rejected() {
        let save = SaveData {
            version: SAVE_VERSION + 1,
            ..SaveData::default()
        };
        let mut sim = Simulation::default();
        assert!(apply_save_data(&mut sim, &save).is_err());
    }

    #[test]
    fn one_time_upgrades_restore_at_most_level_one() {
        let file = parse_upgrade_data(
            r#"{"upgrades": [
                {"index": 0, "name": "Reinforced Hull", "base_cost": 100, "cost_multiplier": 0,
                 "bonuses": [{"component_type": 1, "stat_category": 11, "additive": 1}]}
            ]}"#,
        )
        .expect("upgrade data should parse");
        let mut sim = Simulation::default();
        sim.upgrades = UpgradeManager::from_data(&file);
        let save = SaveData {
            upgrade_levels: vec![7],
            ..SaveData::default()
        };

        let report = apply_save_data(&mut sim, &save).expect("save apply should succeed");

        assert_eq!(report.clamped_upgrades, vec![0]);
        assert!(!report.is_clean());
        assert_eq!(sim.upgrades.level(0), 1);
        assert_eq!(sim.max_reactor_heat(), 2000.0);
    }

    #[test]
    fn stacked_entries_are_reported_as_collisions() {
        let mut save = SaveData::default();
        for name in ["Vent1", "Vent2"] {
            save.components.push(SaveComponent {
                name: name.to_string(),
                x: 4,
                y: 4,
                ..SaveComponent::default()
            });
        }

        let mut sim = Simulation::default();
        let report = apply_save_data(&mut sim, &save).expect("save apply should succeed");

        assert_eq!(report.restored_components, 1);
        assert_eq!(report.collisions, vec![(4, 4, 0)]);
        assert!(report.out_of_bounds.is_empty());
        let kept = sim.component_at(GridCoord::new(4, 4, 0)).expect("first entry kept");
        assert_eq!(kept.name(), "Vent1");
    }
}
