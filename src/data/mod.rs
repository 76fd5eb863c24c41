mod catalog;
mod component_types;
mod loader;
mod upgrade_data;

pub use catalog::{
    ComponentCatalog, SHOP_PAGE_ARCANE, SHOP_PAGE_COUNT, SHOP_PAGE_EXPERIMENTAL, SHOP_PAGE_HEAT,
    SHOP_PAGE_POWER, component_type_from_definition,
};
pub use component_types::{
    CellData, ComponentMetadata, ComponentTypeDefinition, ComponentTypesFile, HeatData,
};
pub use loader::{
    load_component_types_from_path, load_config_from_path, load_upgrade_data_from_path,
    parse_component_types, parse_upgrade_data,
};
pub use upgrade_data::{UpgradeBonus, UpgradeDataFile, UpgradeRecord};

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{load_component_types_from_path, load_upgrade_data_from_path};

    #[test]
    fn data_files_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("reactor_core_data_{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let components = dir.join("component_types.json");
        let upgrades = dir.join("upgrade_data.json");
        fs::write(
            &components,
            r#"{"_source": "test", "components": [{"Name": "Vent1", "Cost": 50}]}"#,
        )
        .expect("write components");
        fs::write(
            &upgrades,
            r#"{"upgrades": [{"index": 0, "name": "Chronometer", "base_cost": 10}]}"#,
        )
        .expect("write upgrades");

        let component_types =
            load_component_types_from_path(&components).expect("component types should load");
        let upgrade_data = load_upgrade_data_from_path(&upgrades).expect("upgrade data should load");

        assert_eq!(component_types.source, "test");
        assert_eq!(component_types.components.len(), 1);
        assert_eq!(upgrade_data.upgrades[0].name, "Chronometer");

        let missing = load_upgrade_data_from_path(dir.join("missing.json"));
        assert!(missing.is_err());

        fs::remove_dir_all(&dir).ok();
    }
}
