use proptest::prelude::*;
use torchlight_blocks::config::{BlockDef, BlocksConfig};
use torchlight_blocks::{Block, BlockRegistry, RegistryError};

fn def(name: &str, id: Option<u16>) -> BlockDef {
    BlockDef {
        name: name.into(),
        id,
        ..BlockDef::default()
    }
}

fn make_registry() -> BlockRegistry {
    let blocks = vec![
        def("air", Some(0)),
        def("stone", Some(1)),
        BlockDef {
            emission: Some(15),
            level_property: Some("block_light_level".into()),
            levels: Some(16),
            ..def("light_block", Some(4))
        },
    ];
    BlockRegistry::from_config(BlocksConfig { blocks }).expect("registry")
}

#[test]
fn ids_are_sparse_and_names_resolve() {
    let reg = make_registry();
    assert_eq!(reg.id_by_name("light_block"), Some(4));
    assert_eq!(reg.name_of(Block { id: 1, state: 0 }), Some("stone"));
    // Gap ids are placeholders without a name
    assert_eq!(reg.name_of(Block { id: 2, state: 0 }), None);
    assert_eq!(reg.name_of(Block { id: 99, state: 0 }), None);
}

#[test]
fn duplicate_names_are_rejected() {
    let err = BlockRegistry::from_config(BlocksConfig {
        blocks: vec![def("air", None), def("air", None)],
    })
    .unwrap_err();
    assert_eq!(err, RegistryError::DuplicateName("air".into()));
}

#[test]
fn shared_ids_are_rejected() {
    let err = BlockRegistry::from_config(BlocksConfig {
        blocks: vec![def("water", Some(3)), def("lava", Some(3))],
    })
    .unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateId {
            id: 3,
            first: "water".into(),
            second: "lava".into(),
        }
    );

    // An implicit id after a gap takes the next free slot.
    let reg = BlockRegistry::from_config(BlocksConfig {
        blocks: vec![def("air", Some(0)), def("stone", Some(5)), def("dirt", None)],
    })
    .unwrap();
    assert_eq!(reg.id_by_name("dirt"), Some(6));
}

#[test]
fn level_counts_are_bounded() {
    let light = |levels| BlockDef {
        level_property: Some("block_light_level".into()),
        levels: Some(levels),
        ..def("light_block", None)
    };
    for levels in [0, 17] {
        let err = BlockRegistry::from_config(BlocksConfig { blocks: vec![light(levels)] });
        assert!(matches!(err, Err(RegistryError::BadLevels { .. })), "{levels}");
    }
    assert!(BlockRegistry::from_config(BlocksConfig { blocks: vec![light(4)] }).is_ok());
}

#[test]
fn unknown_property_and_value_are_errors() {
    let reg = make_registry();
    let bad_prop = reg
        .make_block_by_name("light_block", &[("brightness".into(), "3".into())])
        .unwrap();
    assert!(matches!(bad_prop, Err(RegistryError::UnknownProperty { .. })));
    let bad_value = reg
        .make_block_by_name("light_block", &[("block_light_level".into(), "16".into())])
        .unwrap();
    assert!(matches!(bad_value, Err(RegistryError::UnknownValue { .. })));
    let on_stone = reg
        .make_block_by_name("stone", &[("block_light_level".into(), "3".into())])
        .unwrap();
    assert!(matches!(on_stone, Err(RegistryError::UnknownProperty { .. })));
    assert!(reg.make_block_by_name("torch_wall", &[]).is_none());
}

#[test]
fn loads_from_toml() {
    let reg = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        name = "air"
        id = 0

        [[blocks]]
        name = "lava"
        emission = 15

        [[blocks]]
        name = "light_block"
        level_property = "block_light_level"
        "#,
    )
    .unwrap();
    let lava = reg.get(reg.id_by_name("lava").unwrap()).unwrap();
    assert_eq!(lava.light_emission(0), 15);
    let light = reg.make_block_by_name("light_block", &[]).unwrap().unwrap();
    assert_eq!((light.id, light.state), (2, 0));
    assert_eq!(reg.get(2).unwrap().level.as_ref().map(|l| l.levels), Some(16));
}

proptest! {
    // Light level survives packing and drives emission
    #[test]
    fn light_level_packs_into_state(level in 0u8..=15) {
        let reg = make_registry();
        let block = reg
            .make_block_by_name("light_block", &[("block_light_level".into(), level.to_string())])
            .unwrap()
            .unwrap();
        let ty = reg.get(block.id).unwrap();
        prop_assert_eq!(block.state, level as u16);
        prop_assert_eq!(ty.light_emission(block.state), level);
    }
}
