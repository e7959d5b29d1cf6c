//! Unit tests for the driver sequence (`run_operation`).

#![allow(clippy::expect_used, clippy::unwrap_used)]

use cnab_azure_vm::application::services::driver::{AbortedRun, Outcome, run_operation};
use cnab_azure_vm::domain::{JobError, JobRequest, VmError};

use crate::mocks::{Create, DEMO_JOB, FakeCloud, FakeShell, RecordingReporter};

fn demo_job() -> JobRequest {
    JobRequest::from_json(DEMO_JOB).expect("demo job parses")
}

fn job(installation: &str, image: &str, action: &str) -> JobRequest {
    let input = serde_json::json!({
        "installation_name": installation,
        "image": image,
        "action": action,
        "parameters": {"port": 8080},
        "revision": "01H2",
    });
    JobRequest::from_json(&input.to_string()).expect("job parses")
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_install_on_healthy_vm_succeeds_and_deletes_once() {
    let cloud = FakeCloud::healthy();
    let shell = FakeShell::exiting(0);
    let reporter = RecordingReporter::default();

    let report = run_operation(&demo_job(), "duff", &cloud, &shell, &reporter)
        .await
        .expect("run completes");

    assert_eq!(report.outcome, Outcome::Succeeded);
    assert_eq!(report.exit_code, 0);
    assert_eq!(report.public_ip.as_deref(), Some("10.0.0.5"));
    assert_eq!(report.teardown_succeeded, Some(true));

    let creates = cloud.creates();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].resource_group, "myRG");
    assert_eq!(creates[0].name, "demo");
    assert_eq!(creates[0].image, "myImage");
    assert_eq!(creates[0].admin_username, "duff");

    let deletes = cloud.deletes();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].name, "demo");
    assert_eq!(deletes[0].resource_group, "myRG");
}

#[tokio::test]
async fn test_entrypoint_runs_as_admin_on_public_ip() {
    let cloud = FakeCloud::healthy();
    let shell = FakeShell::exiting(0);

    run_operation(&demo_job(), "duff", &cloud, &shell, &RecordingReporter::default())
        .await
        .expect("run completes");

    let calls = shell.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].host, "10.0.0.5");
    assert_eq!(calls[0].user, "duff");
    assert_eq!(
        calls[0].command,
        "CNAB_ACTION='install' CNAB_INSTALLATION_NAME='demo' /cnab/app/run"
    );
}

#[tokio::test]
async fn test_remote_command_carries_only_action_and_installation_name() {
    let cloud = FakeCloud::healthy();
    let shell = FakeShell::exiting(0);
    let job = job("my app", "rg/img", "upgrade");

    run_operation(&job, "duff", &cloud, &shell, &RecordingReporter::default())
        .await
        .expect("run completes");

    let command = &shell.calls()[0].command;
    assert_eq!(
        command,
        "CNAB_ACTION='upgrade' CNAB_INSTALLATION_NAME='my app' /cnab/app/run"
    );
    assert_eq!(command.matches('=').count(), 2);
    assert!(!command.contains("8080"), "parameters must not be forwarded");
    assert!(!command.contains("01H2"), "revision must not be forwarded");
}

#[tokio::test]
async fn test_custom_admin_username_is_used_for_vm_and_login() {
    let cloud = FakeCloud::healthy();
    let shell = FakeShell::exiting(0);

    run_operation(&demo_job(), "cnab", &cloud, &shell, &RecordingReporter::default())
        .await
        .expect("run completes");

    assert_eq!(cloud.creates()[0].admin_username, "cnab");
    assert_eq!(shell.calls()[0].user, "cnab");
}

#[tokio::test]
async fn test_create_command_is_announced_before_anything_else() {
    let cloud = FakeCloud::healthy();
    let reporter = RecordingReporter::default();

    run_operation(&demo_job(), "duff", &cloud, &FakeShell::exiting(0), &reporter)
        .await
        .expect("run completes");

    let events = reporter.events();
    assert_eq!(events[0].0, "step");
    assert_eq!(
        events[0].1,
        "az vm create --resource-group myRG --name demo --image myImage \
         --admin-username duff --generate-ssh-keys"
    );
}

#[tokio::test]
async fn test_three_segment_image_keeps_remainder() {
    let cloud = FakeCloud::healthy();
    let job = job("demo", "myRG/Canonical:UbuntuServer:18.04-LTS:latest/extra", "install");

    run_operation(&job, "duff", &cloud, &FakeShell::exiting(0), &RecordingReporter::default())
        .await
        .expect("run completes");

    let spec = &cloud.creates()[0];
    assert_eq!(spec.resource_group, "myRG");
    assert_eq!(spec.image, "Canonical:UbuntuServer:18.04-LTS:latest");
}

// ── Provisioning failures ────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_failure_exits_1_without_delete_or_ssh() {
    let cloud = FakeCloud::new(Create::ExitsNonZero);
    let shell = FakeShell::exiting(0);
    let reporter = RecordingReporter::default();

    let report = run_operation(&demo_job(), "duff", &cloud, &shell, &reporter)
        .await
        .expect("provision failure is an outcome, not an error");

    assert_eq!(report.outcome, Outcome::ProvisionFailed);
    assert_eq!(report.exit_code, 1);
    assert_eq!(report.teardown_succeeded, None);
    assert!(cloud.deletes().is_empty(), "nothing to delete");
    assert!(shell.calls().is_empty());
    assert_eq!(reporter.warnings(), vec!["Failed to create VM. Exiting."]);
}

#[tokio::test]
async fn test_create_spawn_error_is_treated_as_create_failure() {
    let cloud = FakeCloud::new(Create::Errors);
    let shell = FakeShell::exiting(0);
    let reporter = RecordingReporter::default();

    let report = run_operation(&demo_job(), "duff", &cloud, &shell, &reporter)
        .await
        .expect("run completes");

    assert_eq!(report.exit_code, 1);
    assert!(cloud.deletes().is_empty());
    assert!(shell.calls().is_empty());
    assert_eq!(reporter.warnings(), vec!["Failed to create VM. Exiting."]);
}

#[tokio::test]
async fn test_create_timeout_deletes_possibly_created_vm() {
    let cloud = FakeCloud::new(Create::TimesOut);
    let shell = FakeShell::exiting(0);
    let reporter = RecordingReporter::default();

    let report = run_operation(&demo_job(), "duff", &cloud, &shell, &reporter)
        .await
        .expect("run completes");

    assert_eq!(report.outcome, Outcome::ProvisionFailed);
    assert_eq!(report.exit_code, 1);
    assert_eq!(report.teardown_succeeded, Some(true));
    let deletes = cloud.deletes();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].name, "demo");
    assert_eq!(deletes[0].resource_group, "myRG");
    assert!(shell.calls().is_empty());
    let warnings = reporter.warnings();
    assert!(warnings[0].contains("timed out"));
    assert_eq!(warnings.last().map(String::as_str), Some("Failed to create VM. Exiting."));
}

#[tokio::test]
async fn test_create_timeout_with_failed_delete_still_exits_1() {
    let cloud = FakeCloud::new(Create::TimesOut).failing_delete();

    let report = run_operation(
        &demo_job(),
        "duff",
        &cloud,
        &FakeShell::exiting(0),
        &RecordingReporter::default(),
    )
    .await
    .expect("run completes");

    assert_eq!(report.exit_code, 1);
    assert_eq!(report.teardown_succeeded, Some(false));
    assert_eq!(cloud.deletes().len(), 1);
}

#[tokio::test]
async fn test_invalid_image_fails_before_any_cloud_call() {
    let cloud = FakeCloud::healthy();
    let shell = FakeShell::exiting(0);
    let reporter = RecordingReporter::default();

    let err = run_operation(&job("demo", "noslash", "install"), "duff", &cloud, &shell, &reporter)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<JobError>(),
        Some(JobError::InvalidImage(_))
    ));
    assert!(cloud.creates().is_empty());
    assert!(cloud.deletes().is_empty());
    assert!(reporter.events().is_empty());
}

// ── Remote failures ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bundle_failure_exits_1_and_still_deletes() {
    let cloud = FakeCloud::healthy();
    let shell = FakeShell::exiting(1);

    let report = run_operation(&demo_job(), "duff", &cloud, &shell, &RecordingReporter::default())
        .await
        .expect("run completes");

    assert_eq!(report.outcome, Outcome::BundleFailed);
    assert_eq!(report.exit_code, 1);
    assert_eq!(cloud.deletes().len(), 1);
    assert_eq!(report.teardown_succeeded, Some(true));
}

#[tokio::test]
async fn test_any_nonzero_entrypoint_status_maps_to_exit_1() {
    let cloud = FakeCloud::healthy();
    let shell = FakeShell::exiting(42);

    let report = run_operation(&demo_job(), "duff", &cloud, &shell, &RecordingReporter::default())
        .await
        .expect("run completes");

    assert_eq!(report.exit_code, 1);
}

#[tokio::test]
async fn test_unparseable_create_output_errors_after_delete() {
    let cloud = FakeCloud::new(Create::Succeeds(b"not json"));
    let shell = FakeShell::exiting(0);

    let err = run_operation(&demo_job(), "duff", &cloud, &shell, &RecordingReporter::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<VmError>(),
        Some(VmError::MalformedCreateOutput(_))
    ));
    assert_eq!(cloud.deletes().len(), 1, "VM exists and must be removed");
    assert!(shell.calls().is_empty());
}

#[tokio::test]
async fn test_missing_public_ip_errors_after_delete() {
    let cloud = FakeCloud::new(Create::Succeeds(br#"{"privateIpAddress":"10.0.0.4"}"#));
    let shell = FakeShell::exiting(0);

    let err = run_operation(&demo_job(), "duff", &cloud, &shell, &RecordingReporter::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<VmError>(),
        Some(VmError::MissingPublicIp)
    ));
    assert_eq!(cloud.deletes().len(), 1);
}

#[tokio::test]
async fn test_unreachable_shell_errors_after_delete() {
    let cloud = FakeCloud::healthy();
    let shell = FakeShell::unreachable();

    let err = run_operation(&demo_job(), "duff", &cloud, &shell, &RecordingReporter::default())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("running bundle entrypoint"));
    assert_eq!(
        err.downcast_ref::<AbortedRun>(),
        Some(&AbortedRun {
            teardown_succeeded: true
        })
    );
    assert_eq!(cloud.deletes().len(), 1);
}

#[tokio::test]
async fn test_error_after_failed_delete_says_vm_was_left_behind() {
    let cloud = FakeCloud::new(Create::Succeeds(b"not json")).failing_delete();

    let err = run_operation(
        &demo_job(),
        "duff",
        &cloud,
        &FakeShell::exiting(0),
        &RecordingReporter::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<AbortedRun>(),
        Some(&AbortedRun {
            teardown_succeeded: false
        })
    );
    assert!(err.downcast_ref::<VmError>().is_some());
    assert!(err.to_string().contains("remove it manually"));
}

// ── Teardown ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_failure_does_not_change_success_exit_code() {
    let cloud = FakeCloud::healthy().failing_delete();
    let reporter = RecordingReporter::default();

    let report = run_operation(&demo_job(), "duff", &cloud, &FakeShell::exiting(0), &reporter)
        .await
        .expect("run completes");

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.teardown_succeeded, Some(false));
    assert_eq!(cloud.deletes().len(), 1, "deletion is not retried");
    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("'demo'"));
    assert!(warnings[0].contains("'myRG'"));
}

#[tokio::test]
async fn test_delete_failure_does_not_change_failure_exit_code() {
    let cloud = FakeCloud::healthy().failing_delete();

    let report = run_operation(
        &demo_job(),
        "duff",
        &cloud,
        &FakeShell::exiting(2),
        &RecordingReporter::default(),
    )
    .await
    .expect("run completes");

    assert_eq!(report.outcome, Outcome::BundleFailed);
    assert_eq!(report.exit_code, 1);
}

#[tokio::test]
async fn test_delete_targets_the_created_vm() {
    let cloud = FakeCloud::healthy();

    run_operation(
        &job("other", "rg-two/img", "uninstall"),
        "duff",
        &cloud,
        &FakeShell::exiting(0),
        &RecordingReporter::default(),
    )
    .await
    .expect("run completes");

    assert_eq!(cloud.deletes(), cloud.creates());
}
