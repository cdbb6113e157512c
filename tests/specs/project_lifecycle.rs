use crate::prelude::*;

#[test]
fn registering_a_project_makes_it_listable() {
    let project = Project::empty();

    project.register_offline("demo");

    project
        .ao()
        .args(&["projects"])
        .passes()
        .stdout_has("demo");
}

#[test]
fn status_reports_zero_sessions_for_a_fresh_daemon() {
    let project = Project::empty();

    project.register_offline("demo");

    project
        .ao()
        .args(&["status"])
        .passes()
        .stdout_has("sessions:");
}
