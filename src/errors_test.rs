// Unit tests for error types and exit codes

use super::*;

#[test]
fn test_exit_codes() {
    assert_eq!(FormprobeError::NoFieldsFound("x".to_string()).exit_code(), 2);
    assert_eq!(FormprobeError::ElementNotFound("x".to_string()).exit_code(), 3);
    assert_eq!(FormprobeError::PersistenceFailed("x".to_string()).exit_code(), 4);
    assert_eq!(FormprobeError::SuggestionFailed("x".to_string()).exit_code(), 5);
    assert_eq!(FormprobeError::Other(anyhow::anyhow!("x")).exit_code(), 1);
}

#[test]
fn test_engine_error_messages() {
    assert_eq!(
        EngineError::NoFormsFound.to_string(),
        "no form fields found on the page"
    );
    assert_eq!(
        EngineError::ElementNotFound {
            key: "email".to_string(),
            attempts: 2,
        }
        .to_string(),
        "element not found for field 'email' after 2 attempts"
    );
}

#[test]
fn test_fault_kind_from_engine_error() {
    let fault = EngineFault::from(&EngineError::NoFormsFound);
    assert_eq!(fault.kind, FaultKind::NoFields);
    assert_eq!(fault.message, "no form fields found on the page");

    let fault = EngineFault::from(&EngineError::PersistenceFailure("disk full".to_string()));
    assert_eq!(fault.kind, FaultKind::Persistence);

    // A missing title is a per-field condition, not a dedicated exit code
    let fault = EngineFault::from(&EngineError::NoMeaningfulTitle("field_3".to_string()));
    assert_eq!(fault.kind, FaultKind::Other);
}

#[test]
fn test_fault_kind_wire_names() {
    assert_eq!(serde_json::to_string(&FaultKind::NoFields).unwrap(), "\"no_fields\"");
    assert_eq!(serde_json::to_string(&FaultKind::NotFound).unwrap(), "\"not_found\"");
    assert_eq!(serde_json::to_string(&FaultKind::Other).unwrap(), "\"other\"");
}

#[test]
fn test_fault_converts_to_cli_error() {
    let fault = EngineFault {
        kind: FaultKind::Suggestion,
        message: "endpoint unreachable".to_string(),
    };
    let err = FormprobeError::from(fault);
    assert_eq!(err.exit_code(), 5);
    assert_eq!(err.to_string(), "endpoint unreachable");
}

#[test]
fn test_anyhow_downcast_recovers_engine_error() {
    let err = anyhow::Error::new(EngineError::NoFormsFound);
    let probe_err = FormprobeError::from(err);
    assert_eq!(probe_err.exit_code(), 2);
}

#[test]
fn test_anyhow_downcast_recovers_formprobe_error() {
    let err = anyhow::Error::new(FormprobeError::ElementNotFound(
        "element not found for field 'email' after 2 attempts".to_string(),
    ));
    let probe_err = FormprobeError::from(err);
    assert_eq!(probe_err.exit_code(), 3);
}

#[test]
fn test_plain_anyhow_maps_to_exit_one() {
    let err = anyhow::anyhow!("could not read page file");
    let probe_err = FormprobeError::from(err);
    assert_eq!(probe_err.exit_code(), 1);
    assert_eq!(probe_err.to_string(), "could not read page file");
}

#[test]
fn test_missing_title_stays_generic() {
    let err = anyhow::Error::new(EngineError::NoMeaningfulTitle("field_3".to_string()));
    let probe_err = FormprobeError::from(err);
    assert_eq!(probe_err.exit_code(), 1);
}
