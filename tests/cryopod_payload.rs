mod common;

use arksave::CloudInventory;
use common::*;

fn embedded_rex() -> Vec<u8> {
    let mut creature_props = str_prop("TamedName", "Rexy");
    creature_props.extend(str_prop("TamerString", "Bob"));
    creature_props.extend(int_prop("DinoID1", 5));
    creature_props.extend(int_prop("DinoID2", 6));
    creature_props.extend(byte_prop("ColorSetIndices", 0, 18));
    creature_props.extend(none_terminator());

    let mut status_props = int_prop("BaseCharacterLevel", 49);
    status_props.extend(none_terminator());

    embedded_save(&[
        ObjSpec::new("Rex_Character_BP_C", &["Rex_Character_BP_C_1"], creature_props),
        ObjSpec::new(
            "DinoCharacterStatusComponent_BP_Rex_C",
            &[
                "DinoCharacterStatusComponent_BP_Rex_C_1",
                "Rex_Character_BP_C_1",
            ],
            status_props,
        ),
    ])
}

fn dino_custom_data(payload: &[u8]) -> Vec<u8> {
    let mut bytes_element = byte_array_prop("Bytes", payload);
    bytes_element.extend(none_terminator());

    let mut data_bytes = struct_array_prop("ByteArrays", "CustomItemByteArray", &[bytes_element]);
    data_bytes.extend(none_terminator());

    let mut element = name_prop("CustomDataName", "Dino");
    element.extend(struct_prop(
        "CustomDataBytes",
        "CustomItemByteArrays",
        &data_bytes,
    ));
    element.extend(none_terminator());
    element
}

fn cryopod_inventory(payload: &[u8]) -> Vec<u8> {
    let main_props = none_terminator();

    let mut pod_props = struct_array_prop(
        "CustomItemDatas",
        "CustomItemData",
        &[dino_custom_data(payload)],
    );
    pod_props.extend(none_terminator());

    inline_object_file(
        1,
        &[
            ObjSpec::new("ArkCloudInventoryData", &["ArkCloudInventoryData_0"], main_props),
            ObjSpec::new(
                "PrimalItem_WeaponEmptyCryopod_C",
                &["PrimalItem_WeaponEmptyCryopod_C_3"],
                pod_props,
            )
            .item(),
        ],
    )
}

#[test]
fn cryopod_payload_decodes_as_embedded_save() {
    let inventory = CloudInventory::from_bytes(&cryopod_inventory(&embedded_rex())).unwrap();
    assert_eq!(inventory.file.parse_error_count(), 0);

    let pods = inventory.cryopod_creatures();
    assert_eq!(pods.len(), 1);
    let rex = &pods[0];
    assert_eq!(rex.species, "Rex");
    assert_eq!(rex.level, 50);
    assert_eq!(rex.name, "Rexy");
    assert_eq!(rex.tamer, "Bob");
    assert_eq!(rex.dino_id, (5 << 32) | 6);
    assert_eq!(rex.colors[0], 18);
}

#[test]
fn empty_cryopod_yields_none_not_an_error() {
    let inventory = CloudInventory::from_bytes(&cryopod_inventory(&[])).unwrap();
    assert_eq!(inventory.file.parse_error_count(), 0);
    assert!(inventory.cryopod_creatures().is_empty());
}

#[test]
fn items_query_sees_the_pod() {
    let inventory = CloudInventory::from_bytes(&cryopod_inventory(&embedded_rex())).unwrap();
    let items = inventory.file.container.items();
    assert_eq!(items.len(), 1);
    assert!(items[0].class_name.value().contains("Cryopod"));
}
