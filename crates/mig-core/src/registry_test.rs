use super::*;

fn script(n: i64) -> Script {
    Script::new(format!("CREATE TABLE t{n} (id INT)"), format!("DROP TABLE t{n}"))
}

#[test]
fn versions_sorted_regardless_of_insertion_order() {
    let registry = Registry::new([(3, script(3)), (1, script(1)), (2, script(2))]).unwrap();
    assert_eq!(registry.versions(), vec![1, 2, 3]);
    assert_eq!(registry.latest(), Some(3));
}

#[test]
fn pending_with_nothing_applied_is_everything() {
    let registry = Registry::new([(20, script(20)), (10, script(10))]).unwrap();
    assert_eq!(registry.pending_after(None), Some(vec![10, 20]));
}

#[test]
fn pending_in_non_contiguous_registry() {
    let registry = Registry::new([(10, script(10)), (20, script(20))]).unwrap();
    assert_eq!(registry.pending_after(Some(10)), Some(vec![20]));
    assert_eq!(registry.pending_after(Some(20)), Some(vec![]));
}

#[test]
fn pending_after_unknown_version_is_none() {
    let registry = Registry::new([(1, script(1)), (3, script(3))]).unwrap();
    assert_eq!(registry.pending_after(Some(2)), None);
    assert_eq!(registry.pending_after(Some(99)), None);
}

#[test]
fn empty_registry() {
    let registry = Registry::default();
    assert!(registry.is_empty());
    assert_eq!(registry.latest(), None);
    assert_eq!(registry.pending_after(None), Some(vec![]));
}

#[test]
fn duplicate_version_rejected() {
    let err = Registry::new([(1, script(1)), (1, script(2))]).unwrap_err();
    assert!(matches!(err, MigrateError::ConfigError { .. }));
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn non_positive_version_rejected() {
    for version in [0, -5] {
        let err = Registry::new([(version, script(1))]).unwrap_err();
        assert!(matches!(err, MigrateError::ConfigError { .. }), "{version}");
    }
}

#[test]
fn lookup() {
    let registry = Registry::new([(5, script(5))]).unwrap();
    assert!(registry.get(6).is_none());
    assert_eq!(registry.get(5).unwrap().down(), "DROP TABLE t5");
}
