use crate::prelude::*;

#[test]
fn spawn_then_list_then_kill_round_trips_through_the_daemon() {
    let project = Project::empty();
    project.register_offline("demo");

    let spawn = project.ao().args(&["spawn", "demo", "--prompt", "build the thing"]).passes();
    let stdout = spawn.stdout();
    let id = stdout
        .lines()
        .find_map(|l| l.strip_prefix("id:").map(|s| s.trim().to_string()))
        .expect("spawn output should report a session id");

    project.ao().args(&["list"]).passes().stdout_has(&id);

    project
        .ao()
        .args(&["send", &id, "keep going"])
        .passes()
        .stdout_has("sent");

    project.ao().args(&["kill", &id]).passes().stdout_has(&id);

    let all = project.ao().args(&["list", "--all"]).passes();
    assert!(all.stdout().contains(&id), "killed session should still appear with --all");
}

#[test]
fn killing_an_unknown_session_reports_not_found() {
    let project = Project::empty();
    project.register_offline("demo");

    project
        .ao()
        .args(&["kill", "does-not-exist"])
        .fails()
        .stderr_has("session");
}

#[test]
fn spawning_against_an_unregistered_project_is_rejected() {
    let project = Project::empty();

    project
        .ao()
        .args(&["spawn", "ghost-project", "--prompt", "hi"])
        .fails();
}
