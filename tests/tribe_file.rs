mod common;

use arksave::Tribe;
use common::*;

fn swamp_tribe() -> Vec<u8> {
    let mut data = int_prop("TribeID", 1446520645);
    data.extend(str_prop("TribeName", "Swamp People"));
    data.extend(int_prop("OwnerPlayerDataID", 42));
    data.extend(int_array_prop("MembersPlayerDataID", &[42, 43, 44]));
    data.extend(str_array_prop("MembersPlayerName", &["Ada", "Ben", "Cleo"]));
    data.extend(str_array_prop(
        "TribeLog",
        &[
            "Day 1, 12:00:00: Tamed a Rex",
            "Day 2, 03:14:15: <RichColor Color='1,0,0,1'>Lost</>",
        ],
    ));
    data.extend(int_array_prop("TribeAlliances", &[77]));
    data.extend(none_terminator());

    let mut props = struct_prop("TribeData", "TribeData", &data);
    props.extend(none_terminator());

    inline_object_file(
        1,
        &[ObjSpec::new("PrimalTribeData", &["PrimalTribeData_4"], props)],
    )
}

#[test]
fn tribe_members_and_logs() {
    let tribe = Tribe::from_bytes(&swamp_tribe()).unwrap();
    assert_eq!(tribe.file.parse_error_count(), 0);

    let info = tribe.info().unwrap();
    assert_eq!(info.tribeid, 1446520645);
    assert_eq!(info.tribe, "Swamp People");
    assert_eq!(info.owner_id, 42);
    assert_eq!(info.member_count(), 3);
    assert_eq!(info.members[1].name, "Ben");
    assert_eq!(info.members[2].player_id, 44);
    assert_eq!(info.alliances, vec![77]);

    assert_eq!(info.logs.len(), 2);
    assert_eq!(info.logs[0].day, 1);
    assert_eq!(info.logs[0].clean_message(), "Tamed a Rex");
    assert_eq!(info.logs[1].day, 2);
    assert_eq!(info.logs[1].time, "03:14:15");
    assert_eq!(info.logs[1].clean_message(), "Lost");
}

#[test]
fn member_ranks_default_to_zero() {
    let tribe = Tribe::from_bytes(&swamp_tribe()).unwrap();
    let info = tribe.info().unwrap();
    assert!(info.members.iter().all(|m| m.rank == 0));
}
