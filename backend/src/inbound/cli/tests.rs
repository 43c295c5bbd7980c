//! Tests for the command-line adapter.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockComplaintCommand, MockComplaintQuery, MockSubmitComplaint};
use crate::domain::{
    ComplaintInsert, ComplaintUpdate, ErrorCode, NewComplaint, Role, UserId,
};

fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid user id")
}

fn citizen() -> Session {
    Session::new(user("citizen-1"), Some("Asha".to_owned()), None, Role::User)
}

fn admin() -> Session {
    Session::new(user("admin-1"), None, None, Role::Admin)
}

fn complaint(id: &str, owner: &str, title: &str, status: ComplaintStatus, minute: i64) -> Complaint {
    let created_at = Utc
        .with_ymd_and_hms(2026, 6, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::minutes(minute);
    let mut record = ComplaintInsert::seeded(
        NewComplaint {
            title: title.to_owned(),
            description: "details".to_owned(),
            category: Category::Garbage,
            images: Vec::new(),
            location: None,
            user_id: user(owner),
            user_name: owner.to_owned(),
        },
        created_at,
    )
    .into_record(
        ComplaintId::new(id).expect("valid id"),
        created_at,
        created_at,
    );
    if status != ComplaintStatus::Pending {
        record.apply(
            &ComplaintUpdate::Status(StatusEvent::new(
                status,
                None,
                "Admin",
                created_at + Duration::minutes(1),
            )),
            created_at,
        );
    }
    Complaint::try_from(record).expect("consistent complaint")
}

fn state(
    command: MockComplaintCommand,
    query: MockComplaintQuery,
    submissions: Option<MockSubmitComplaint>,
) -> CliState {
    CliState {
        command: Arc::new(command),
        query: Arc::new(query),
        submissions: submissions.map(|mock| Arc::new(mock) as Arc<dyn SubmitComplaint>),
    }
}

fn titles(output: &CommandOutput) -> Vec<&str> {
    match output {
        CommandOutput::Complaints(complaints) => {
            complaints.iter().map(Complaint::title).collect()
        }
        other => panic!("expected complaints, got {other:?}"),
    }
}

#[rstest]
#[case::list(Command::List(FilterArgs::default()))]
#[case::dashboard(Command::Dashboard)]
#[case::review(Command::Review(ReviewArgs {
    id: "c-1".to_owned(),
    status: Some(ComplaintStatus::Resolved),
    priority: None,
    note: None,
}))]
#[tokio::test]
async fn admin_commands_are_forbidden_for_citizens(#[case] command: Command) {
    let mut query = MockComplaintQuery::new();
    query.expect_list_all().times(0);
    query.expect_get().times(0);
    let mut commands = MockComplaintCommand::new();
    commands.expect_review().times(0);

    let error = state(commands, query, None)
        .run(&citizen(), command)
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn mine_lists_own_complaints_and_filters_locally() {
    let listed = vec![
        complaint("c-3", "citizen-1", "Overflowing bin", ComplaintStatus::Pending, 3),
        complaint("c-2", "citizen-1", "Broken BIN lid", ComplaintStatus::Resolved, 2),
        complaint("c-1", "citizen-1", "Bin missing", ComplaintStatus::Pending, 1),
    ];
    let mut query = MockComplaintQuery::new();
    query
        .expect_list_by_owner()
        .times(1)
        .withf(|user_id| user_id.as_ref() == "citizen-1")
        .return_once(move |_| Ok(listed));

    let output = state(MockComplaintCommand::new(), query, None)
        .run(
            &citizen(),
            Command::Mine(FilterArgs {
                status: Some(ComplaintStatus::Pending),
                category: None,
                search: Some("bin".to_owned()),
            }),
        )
        .await
        .expect("listing succeeds");

    assert_eq!(titles(&output), vec!["Overflowing bin", "Bin missing"]);
}

#[tokio::test]
async fn list_with_status_uses_store_query() {
    let listed = vec![complaint("c-9", "u2", "Dumped sofa", ComplaintStatus::Rejected, 9)];
    let mut query = MockComplaintQuery::new();
    query.expect_list_all().times(0);
    query
        .expect_list_by_status()
        .times(1)
        .withf(|status| *status == ComplaintStatus::Rejected)
        .return_once(move |_| Ok(listed));

    let output = state(MockComplaintCommand::new(), query, None)
        .run(
            &admin(),
            Command::List(FilterArgs {
                status: Some(ComplaintStatus::Rejected),
                ..FilterArgs::default()
            }),
        )
        .await
        .expect("listing succeeds");

    assert_eq!(titles(&output), vec!["Dumped sofa"]);
}

#[tokio::test]
async fn citizens_cannot_view_other_peoples_complaints() {
    let mut query = MockComplaintQuery::new();
    query
        .expect_get()
        .times(1)
        .return_once(|_| Ok(complaint("c-4", "neighbour", "Noise", ComplaintStatus::Pending, 0)));

    let error = state(MockComplaintCommand::new(), query, None)
        .run(&citizen(), Command::Show { id: "c-4".to_owned() })
        .await
        .expect_err("not the owner");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn show_returns_timeline_newest_first() {
    let mut query = MockComplaintQuery::new();
    query.expect_get().times(1).return_once(|_| {
        Ok(complaint(
            "c-5",
            "citizen-1",
            "Dark lane",
            ComplaintStatus::InProgress,
            0,
        ))
    });

    let output = state(MockComplaintCommand::new(), query, None)
        .run(&citizen(), Command::Show { id: "c-5".to_owned() })
        .await
        .expect("owner may view");

    let CommandOutput::Detail(detail) = output else {
        panic!("expected detail output");
    };
    let statuses: Vec<_> = detail.timeline.iter().map(StatusEvent::status).collect();
    assert_eq!(
        statuses,
        vec![ComplaintStatus::InProgress, ComplaintStatus::Pending]
    );
}

#[tokio::test]
async fn show_rejects_blank_ids() {
    let error = state(MockComplaintCommand::new(), MockComplaintQuery::new(), None)
        .run(&admin(), Command::Show { id: "  ".to_owned() })
        .await
        .expect_err("blank id");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn review_defaults_missing_fields_to_current_values() {
    let mut query = MockComplaintQuery::new();
    query.expect_get().times(1).return_once(|_| {
        Ok(complaint("c-6", "citizen-1", "Pothole", ComplaintStatus::Pending, 0))
    });
    let mut commands = MockComplaintCommand::new();
    commands
        .expect_review()
        .times(1)
        .withf(|request| {
            request.complaint_id.as_ref() == "c-6"
                && request.status == ComplaintStatus::Pending
                && request.priority == Priority::High
                && request.note.as_deref() == Some("Escalated")
                && request.reviewer == "Admin"
        })
        .return_once(|_| {
            Ok(ReviewOutcome {
                status_recorded: true,
                priority_changed: true,
            })
        });

    let output = state(commands, query, None)
        .run(
            &admin(),
            Command::Review(ReviewArgs {
                id: "c-6".to_owned(),
                status: None,
                priority: Some(Priority::High),
                note: Some("Escalated".to_owned()),
            }),
        )
        .await
        .expect("review succeeds");

    assert!(matches!(
        output,
        CommandOutput::Reviewed(ReviewOutcome {
            status_recorded: true,
            priority_changed: true
        })
    ));
}

#[tokio::test]
async fn dashboard_summarises_and_caps_recent_list() {
    let listed: Vec<Complaint> = (0..7)
        .rev()
        .map(|minute| {
            let status = if minute % 2 == 0 {
                ComplaintStatus::Resolved
            } else {
                ComplaintStatus::Pending
            };
            complaint(&format!("c-{minute}"), "u1", "Bin", status, minute)
        })
        .collect();
    let mut query = MockComplaintQuery::new();
    query
        .expect_list_all()
        .times(1)
        .return_once(move || Ok(listed));

    let output = state(MockComplaintCommand::new(), query, None)
        .run(&admin(), Command::Dashboard)
        .await
        .expect("dashboard");

    let CommandOutput::Dashboard(dashboard) = output else {
        panic!("expected dashboard output");
    };
    assert_eq!(dashboard.summary.total, 7);
    assert_eq!(dashboard.summary.resolved, 4);
    assert_eq!(dashboard.summary.pending, 3);
    assert_eq!(dashboard.recent.len(), RECENT_COMPLAINTS);
    assert_eq!(dashboard.recent[0].id().as_ref(), "c-6");
}

#[tokio::test]
async fn submit_without_uploader_is_unavailable() {
    let error = state(MockComplaintCommand::new(), MockComplaintQuery::new(), None)
        .run(
            &citizen(),
            Command::Submit(SubmitArgs {
                title: "Leak".to_owned(),
                description: "Pipe burst".to_owned(),
                category: Some(Category::WaterSupply),
                images: Vec::new(),
                latitude: None,
                longitude: None,
                address: None,
            }),
        )
        .await
        .expect_err("uploads unconfigured");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn submit_forwards_form_fields() {
    let mut submissions = MockSubmitComplaint::new();
    submissions
        .expect_submit()
        .times(1)
        .withf(|session, submission| {
            session.user_id().as_ref() == "citizen-1"
                && submission.images
                    == vec![LocalImage::new("/tmp/a.jpg"), LocalImage::new("/tmp/b.png")]
                && submission.location
                    == Some(Location {
                        latitude: Some(12.9),
                        longitude: Some(77.6),
                        address: Some("MG Road".to_owned()),
                    })
        })
        .return_once(|_, _| Ok(ComplaintId::new("c-new").expect("valid id")));

    let output = state(
        MockComplaintCommand::new(),
        MockComplaintQuery::new(),
        Some(submissions),
    )
    .run(
        &citizen(),
        Command::Submit(SubmitArgs {
            title: "Leak".to_owned(),
            description: "Pipe burst".to_owned(),
            category: Some(Category::WaterSupply),
            images: vec!["/tmp/a.jpg".into(), "/tmp/b.png".into()],
            latitude: Some(12.9),
            longitude: Some(77.6),
            address: Some(" MG Road ".to_owned()),
        }),
    )
    .await
    .expect("submitted");

    let rendered = serde_json::to_value(&output).expect("serialize");
    assert_eq!(rendered, serde_json::json!({ "complaintId": "c-new" }));
}

#[tokio::test]
async fn categories_lists_the_catalogue() {
    let output = state(MockComplaintCommand::new(), MockComplaintQuery::new(), None)
        .run(&citizen(), Command::Categories)
        .await
        .expect("catalogue");

    let CommandOutput::Categories(entries) = output else {
        panic!("expected categories output");
    };
    assert_eq!(entries.len(), Category::ALL.len());
    assert_eq!(
        entries[0],
        CategoryEntry {
            id: "power_cut",
            label: "Power Cut / Electrical Issues"
        }
    );
}

#[rstest]
fn parses_list_filters() {
    let cli = Cli::try_parse_from([
        "cleantrack",
        "list",
        "--status",
        "in_progress",
        "--category",
        "road_damage",
        "--search",
        "pothole",
    ])
    .expect("arguments parse");

    let Command::List(filter) = cli.command else {
        panic!("expected list command");
    };
    assert_eq!(filter.status, Some(ComplaintStatus::InProgress));
    assert_eq!(filter.category, Some(Category::RoadDamage));
    assert_eq!(filter.search.as_deref(), Some("pothole"));
}

#[rstest]
fn rejects_unknown_category_ids() {
    let error = Cli::try_parse_from([
        "cleantrack",
        "submit",
        "--title",
        "t",
        "--description",
        "d",
        "--category",
        "stray_dogs",
    ])
    .expect_err("unknown category");

    assert!(error.to_string().contains("stray_dogs"), "{error}");
}
