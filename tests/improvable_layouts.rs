//! This module is an integration test that checks the slots that can be spared
//! for contracts and records whose declared order wastes space.
#![cfg(test)]

use storage_layout_packer::variable::VariableKind;

mod common;

#[test]
fn split_halves_spare_a_slot() -> anyhow::Result<()> {
    // uint128 a; uint256 b; uint128 c;
    let analysis = common::analyze_asset("DocExpensive")?;

    assert_eq!(analysis.storage.spared_slots(), 1);
    let optimized = analysis
        .storage
        .optimized()
        .ok_or_else(|| anyhow::anyhow!("expected an improved layout"))?;
    assert_eq!(optimized.slot_count(), 2);
    assert_eq!(common::names(optimized.variables()), vec!["a", "c", "b"]);

    Ok(())
}

#[test]
fn expensive_struct_spares_three_slots() -> anyhow::Result<()> {
    let analysis = common::analyze_asset("ExpensiveStruct")?;

    assert_eq!(analysis.records.total_spared, 3);
    assert_eq!(common::optimized_slot_count(&analysis, "ExpensiveStruct")?, 5);

    // The single record-typed state variable cannot be improved
    assert!(analysis.storage.is_tight());

    Ok(())
}

#[test]
fn unpacked_user_spares_two_slots() -> anyhow::Result<()> {
    let analysis = common::analyze_asset("UserUnpacked")?;

    assert_eq!(analysis.records.total_spared, 2);
    assert_eq!(common::optimized_slot_count(&analysis, "UserUnpacked")?, 3);

    Ok(())
}

#[test]
fn struct_between_halves_is_improvable_at_both_levels() -> anyhow::Result<()> {
    // uint128 a; ExpensiveStruct example; uint128 b;
    let analysis = common::analyze_asset("StructBetweenUint128")?;

    assert_eq!(analysis.records.total_spared, 3);
    assert_eq!(common::optimized_slot_count(&analysis, "ExpensiveStruct")?, 5);
    assert_eq!(analysis.storage.spared_slots(), 1);

    // The record-typed variable keeps a slot to itself after the packed halves
    let optimized = analysis
        .storage
        .optimized()
        .ok_or_else(|| anyhow::anyhow!("expected an improved layout"))?;
    let last = &optimized.slots()[optimized.slot_count() - 1];
    assert_eq!(last.members().len(), 1);
    assert_eq!(last.members()[0].kind(), VariableKind::Record);

    Ok(())
}

#[test]
fn nested_records_are_analyzed_one_level_at_a_time() -> anyhow::Result<()> {
    let analysis = common::analyze_asset("NestedExpensiveStruct")?;

    assert_eq!(analysis.records.total_spared, 3 + 1 + 1);
    assert_eq!(analysis.records.improvable.len(), 3);
    assert_eq!(common::optimized_slot_count(&analysis, "ExpensiveStruct")?, 5);
    assert_eq!(common::optimized_slot_count(&analysis, "ChildStruct")?, 2);
    assert_eq!(common::optimized_slot_count(&analysis, "NestedExpensive")?, 4);

    let positions: Vec<usize> = analysis
        .records
        .improvable
        .iter()
        .map(|r| r.position)
        .collect();
    assert_eq!(positions, vec![0, 1, 2]);

    assert_eq!(analysis.storage.spared_slots(), 1);

    Ok(())
}

#[test]
fn enums_pack_with_smaller_values() -> anyhow::Result<()> {
    // uint128 a; uint256 c; Direction directionChosen;
    let analysis = common::analyze_asset("PackableEnum")?;

    assert_eq!(analysis.storage.spared_slots(), 1);

    Ok(())
}

#[test]
fn mappings_inside_records_are_ignored() -> anyhow::Result<()> {
    let analysis = common::analyze_asset("NestedMapping")?;
    let record = common::improvable_record(&analysis, "abc")?;

    assert_eq!(record.outcome.spared_slots(), 1);
    let optimized = record
        .outcome
        .optimized()
        .ok_or_else(|| anyhow::anyhow!("expected an improved layout"))?;
    assert!(!common::names(optimized.variables()).contains(&"someNestedMapping"));

    Ok(())
}

#[test]
fn unsized_value_types_only_skip_their_record() -> anyhow::Result<()> {
    // Quote holds a user-defined value type whose size is not reported.
    let analysis = common::analyze_asset("PriceFeed")?;

    assert!(analysis.records.get("Quote").is_none());
    assert_eq!(analysis.storage.spared_slots(), 1);
    assert_eq!(
        analysis.storage.optimized().map(|slots| slots.slot_count()),
        Some(4)
    );

    Ok(())
}

#[test]
fn internal_function_pointers_pack_with_wide_values() -> anyhow::Result<()> {
    // function (uint256) internal returns (uint256) onUpdate; uint256 total; bytes24 tag;
    let analysis = common::analyze_asset("PriceFeed")?;

    assert_eq!(analysis.records.total_spared, 1);
    assert_eq!(common::optimized_slot_count(&analysis, "Hooks")?, 2);

    Ok(())
}
