use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_deep_recursion_grows_stack() {
    fn descend(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { descend(n - 1) + 1 })
    }

    // Overflows a default 8MB stack without growth.
    assert_eq!(descend(100_000), 100_000);
}

#[test]
fn test_passes_result_through() {
    let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("nope"));
    assert_eq!(result, Err("nope"));
}

#[test]
fn test_depth_limit_rejects_past_limit() {
    let mut depth = DepthLimit::new(Some(2));
    assert_eq!(depth.enter(), Ok(()));
    assert_eq!(depth.enter(), Ok(()));
    assert_eq!(depth.enter(), Err(DepthExceeded { limit: 2 }));
    assert_eq!(depth.depth(), 2);

    depth.exit();
    assert_eq!(depth.enter(), Ok(()));
}

#[test]
fn test_depth_unlimited() {
    let mut depth = DepthLimit::new(None);
    for _ in 0..10_000 {
        assert!(depth.enter().is_ok());
    }
    assert_eq!(depth.depth(), 10_000);
    depth.reset();
    assert_eq!(depth.depth(), 0);
}

#[test]
fn test_depth_exceeded_message() {
    assert_eq!(
        DepthExceeded { limit: 64 }.to_string(),
        "maximum call depth exceeded (limit: 64)"
    );
}
