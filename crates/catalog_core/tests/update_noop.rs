use catalog_core::{update, CatalogState, Msg};

#[test]
fn update_is_noop() {
    let state = CatalogState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn stale_poll_result_without_job_is_noop() {
    let mut state = CatalogState::new();
    state.consume_dirty();
    let (mut next, effects) = update(
        state.clone(),
        Msg::TaskStatusReceived {
            task_id: "ghost".into(),
            result: Err(catalog_core::CatalogError::NotFound("gone".into())),
        },
    );

    assert_eq!(state, next);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
