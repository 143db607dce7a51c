use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["clinicmap-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["clinicmap-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["clinicmap-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn validate_all_defaults_leave_options_unset() {
    let cli = Cli::try_parse_from(["clinicmap-cli", "validate", "all"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Validate {
            command: ValidateCommands::All {
                batch_size: None,
                limit: None,
                state: None,
                output: None,
            }
        })
    ));
}

#[test]
fn validate_all_with_filters() {
    let cli = Cli::try_parse_from([
        "clinicmap-cli",
        "validate",
        "all",
        "--batch-size",
        "3",
        "--limit",
        "50",
        "--state",
        "FL",
        "--output",
        "out.json",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Validate {
            command:
                ValidateCommands::All {
                    batch_size,
                    limit,
                    state,
                    output,
                },
        }) => {
            assert_eq!(batch_size, Some(3));
            assert_eq!(limit, Some(50));
            assert_eq!(state.as_deref(), Some("FL"));
            assert_eq!(output, Some(PathBuf::from("out.json")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn validate_all_rejects_non_numeric_batch_size() {
    let result = Cli::try_parse_from(["clinicmap-cli", "validate", "all", "--batch-size", "many"]);
    assert!(result.is_err());
}

#[test]
fn validate_one_takes_positional_id() {
    let cli = Cli::try_parse_from(["clinicmap-cli", "validate", "one", "abc-123"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Validate {
            command: ValidateCommands::One { ref id }
        }) if id == "abc-123"
    ));
}

#[test]
fn validate_one_requires_id() {
    assert!(Cli::try_parse_from(["clinicmap-cli", "validate", "one"]).is_err());
}

#[test]
fn correct_requires_report() {
    assert!(Cli::try_parse_from(["clinicmap-cli", "correct"]).is_err());
}

#[test]
fn correct_parses_flags() {
    let cli = Cli::try_parse_from([
        "clinicmap-cli",
        "correct",
        "--report",
        "validation-report.json",
        "--delete-unlocatable",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Correct {
            ref report,
            delete_unlocatable: true,
            dry_run: true,
        }) if report == &PathBuf::from("validation-report.json")
    ));
}

#[test]
fn correct_flags_default_to_false() {
    let cli = Cli::try_parse_from(["clinicmap-cli", "correct", "--report", "r.json"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Correct {
            delete_unlocatable: false,
            dry_run: false,
            ..
        })
    ));
}

#[test]
fn default_report_path_is_timestamped() {
    use chrono::TimeZone;

    let at = chrono::Utc
        .with_ymd_and_hms(2026, 10, 16, 14, 3, 22)
        .single()
        .expect("valid timestamp");
    assert_eq!(
        export::default_report_path(at),
        PathBuf::from("validation-report-2026-10-16T14-03-22-000Z.json")
    );
}

#[test]
fn describe_relocate_action_shows_distance() {
    let action = clinicmap_validator::CorrectionAction::Relocate {
        record_id: "r-1".to_string(),
        latitude: 25.761_7,
        longitude: -80.191_8,
        distance_m: Some(412.4),
    };
    assert_eq!(
        output::describe_action(&action),
        "relocate r-1 -> 25.761700, -80.191800 (412m)"
    );
}

#[test]
fn export_survives_write_and_read() {
    use clinicmap_core::LocationRecord;
    use clinicmap_validator::{
        generate_report, precision_breakdown, CoordinateStatus, CorrectionPolicy,
        ValidationConfig, ValidationResult,
    };

    let record = LocationRecord {
        id: "r-9".to_string(),
        name: "Harbor Speech".to_string(),
        address: None,
        city: Some("Tampa".to_string()),
        state: Some("FL".to_string()),
        latitude: None,
        longitude: None,
    };
    let mut result = ValidationResult::pending(&record);
    result.correction_needed = true;
    result.coordinate_status = CoordinateStatus::Missing;
    result.issues.push("Invalid or missing coordinates".to_string());

    let config = ValidationConfig::default();
    let results = vec![result];
    let report = generate_report(&results, &config);
    let export = export::ValidationExport {
        run_id: uuid::Uuid::new_v4(),
        generated_at: chrono::Utc::now(),
        config,
        summary: report.summary.clone(),
        precision: precision_breakdown(&results, &config),
        state_analysis: Vec::new(),
        recommendations: report.recommendations.clone(),
        issues: report.issues.clone(),
        results,
    };

    let path = std::env::temp_dir().join(format!("clinicmap-export-{}.json", export.run_id));
    export::write_export(&path, &export).expect("write export");
    let loaded = export::read_export(&path).expect("read export");
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.run_id, export.run_id);
    assert_eq!(loaded.report(), report);
    let plan = clinicmap_validator::plan_corrections(
        &loaded.report(),
        CorrectionPolicy {
            delete_unlocatable: true,
        },
    );
    assert!(matches!(
        &plan[..],
        [clinicmap_validator::CorrectionAction::Delete { .. }]
    ));
}

#[test]
fn read_export_rejects_non_report_json() {
    let path = std::env::temp_dir().join(format!("clinicmap-bad-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, "{\"hello\": 1}").expect("write fixture");
    let result = export::read_export(&path);
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
}
