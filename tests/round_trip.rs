//! End-to-end round trips through the JSON document and snapshot formats.

use cadena::prelude::*;
use chrono::NaiveDate;
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The 3x3 cumulative development triangle: origins 2018-2020,
/// developments 12/24/36 months.
fn dev_triangle() -> Triangle {
    let values = HostArray::from_vec(
        [1, 1, 3, 3],
        vec![10.0, 30.0, 50.0, 0.0, 15.0, 28.0, 0.0, 0.0, 12.0],
    )
    .unwrap();
    Triangle::new(
        DimVec::Str(vec!["total".to_string()]),
        DimVec::Str(vec!["paid".to_string()]),
        DimVec::Int(vec![2018, 2019, 2020]),
        DimVec::Int(vec![12, 24, 36]),
        values,
        date(2020, 12, 31),
    )
    .unwrap()
    .with_grains(Grain::Annual, Grain::Annual)
    .with_key_labels(vec!["grand_total".to_string()])
}

#[test]
fn dev_triangle_encodes_incrementally_and_recovers_cumulative() {
    let tri = dev_triangle();
    let doc = tri.to_json().unwrap();

    // Values travel as first differences along development.
    assert!(doc.contains("[[[[10.0,20.0,20.0],[0.0,15.0,13.0],[0.0,0.0,12.0]]]]"));
    assert!(doc.contains(r#""sparse":false"#));

    let back = Triangle::from_json(&doc).unwrap();
    assert_eq!(back, tri);
    let host = back.values().materialize().unwrap();
    assert_eq!(
        host.as_slice(),
        &[10.0, 30.0, 50.0, 0.0, 15.0, 28.0, 0.0, 0.0, 12.0]
    );
}

#[test]
fn nested_paid_and_incurred_survive_round_trip() {
    let parent = dev_triangle()
        .with_sub_tri("paid", dev_triangle())
        .with_sub_tri(
            "incurred",
            dev_triangle().with_table("ldf_", Table::single_column("ldf", vec![1.8, 1.2]).unwrap()),
        );

    let back = Triangle::from_json(&parent.to_json().unwrap()).unwrap();
    assert_eq!(back, parent);

    let names: Vec<&str> = back.sub_tris().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["incurred", "paid"]);
    assert!(back.sub_tris()["incurred"].dfs().contains_key("ldf_"));
}

#[test]
fn child_insertion_order_does_not_change_the_document() {
    let a = dev_triangle()
        .with_sub_tri("paid", dev_triangle())
        .with_sub_tri("incurred", dev_triangle());
    let b = dev_triangle()
        .with_sub_tri("incurred", dev_triangle())
        .with_sub_tri("paid", dev_triangle());
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn snapshot_preserves_nested_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested.csn");
    let parent = dev_triangle()
        .with_sub_tri("paid", dev_triangle())
        .with_table("sigma_", Table::single_column("sigma", vec![0.3, 0.2]).unwrap());

    parent.to_snapshot(&path, None).unwrap();
    let back = Triangle::from_snapshot(&path).unwrap();
    assert_eq!(back, parent);
}

/// Integer-valued cell grids keep the incremental transform exact, so
/// round trips can be compared with equality.
fn integer_cells(len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec((-50i32..=50).prop_map(f64::from), len)
}

fn arbitrary_triangle() -> impl Strategy<Value = Triangle> {
    (1usize..=3, 1usize..=4, any::<bool>())
        .prop_flat_map(|(o, d, cumulative)| {
            (integer_cells(o * d), Just(o), Just(d), Just(cumulative))
        })
        .prop_map(|(cells, o, d, cumulative)| {
            let incremental = HostArray::from_vec([1, 1, o, d], cells).unwrap();
            let values = if cumulative {
                incremental.incr_to_cum()
            } else {
                incremental
            };
            Triangle::new(
                DimVec::Str(vec!["total".to_string()]),
                DimVec::Str(vec!["paid".to_string()]),
                DimVec::Int((0..o as i64).map(|i| 2018 + i).collect()),
                DimVec::Int((1..=d as i64).map(|i| 12 * i).collect()),
                values,
                date(2020, 12, 31),
            )
            .unwrap()
            .with_cumulative(cumulative)
        })
}

proptest! {
    #[test]
    fn prop_round_trip_reproduces_triangle(tri in arbitrary_triangle()) {
        let doc = tri.to_json().unwrap();
        let back = Triangle::from_json(&doc).unwrap();
        prop_assert_eq!(back, tri);
    }

    #[test]
    fn prop_encode_is_deterministic(tri in arbitrary_triangle()) {
        prop_assert_eq!(tri.to_json().unwrap(), tri.to_json().unwrap());
    }
}
