//! End-to-end tests of the matching pipeline.
//!
//! These tests run every stage together:
//! 1. Read flows
//! 2. Search, suggest and select
//! 3. Parse labels
//! 4. Evaluate impacts
//! 5. Write tables and charts

use std::sync::Arc;

use approx::assert_relative_eq;
use matching::{
    chart::write_charts,
    table::{read_flows, write_assessed},
    testing::{MockChat, MockDatabase, MockEngine},
    Assessor, Candidate, ChatSelector, DatabaseSnapshot, FactorEngine, FlowRecord,
    ImpactCategory, MatchConfig, MatchError, MemoryDatabase, OfflineChat, ProcessRecord,
    RankingSelector, RowOutcome,
};

#[tokio::test]
async fn test_waste_graphite_scenario() {
    let db = MockDatabase::new()
        .with_candidates_when(
            "waste",
            "GLO",
            vec![Candidate::new("waste something", "GLO", "kg")],
        )
        .with_process(ProcessRecord::new("ws", "waste something", "GLO", "kg"));
    let chat = Arc::new(MockChat::new().with_reply("related to 'waste graphite'", "waste something, GLO, kg"));
    let config = MatchConfig::default();
    let selector = ChatSelector::new(chat.clone(), &config.system_message, config.selection.clone());
    let assessor = Assessor::new(
        db,
        MockEngine::new().with_default_score(42.0),
        chat.clone(),
        selector,
        config,
    );

    let assessment = assessor
        .assess(&[FlowRecord::new(0, "Waste Graphite", 1.5)])
        .await
        .unwrap();

    assert_eq!(assessment.assessed.len(), 1);
    let row = &assessment.assessed[0];
    assert_eq!(row.process.process_name, "waste something");
    assert_eq!(row.process.location, "GLO");
    assert_eq!(row.process.unit, "kg");
    assert_relative_eq!(row.impacts.get(ImpactCategory::Gwp).unwrap(), 63.0);
    assert_eq!(row.impacts.len(), 9);

    // Only the selection prompt was sent; the direct search hit
    let calls = chat.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].user.contains("- waste something, GLO, kg"));
}

#[tokio::test]
async fn test_partial_failures_keep_the_batch_going() {
    let db = MockDatabase::new()
        .with_candidates_when("copper", "GLO", vec![Candidate::new("market for copper", "GLO", "kg")])
        .with_candidates_when("steel", "GLO", vec![Candidate::new("market for steel", "GLO", "kg")])
        .with_candidates_when("cement", "RoW", vec![Candidate::new("cement, Portland", "RoW", "kg")])
        .with_process(ProcessRecord::new("fe", "market for steel", "GLO", "kg"));
    let chat = Arc::new(
        MockChat::new()
            .failing_when("related to 'copper'")
            .with_reply("related to 'steel'", "market for steel, GLO, kg")
            .with_reply("related to 'cement'", "cement, Portland, RoW, kg")
            .with_reply("related to 'gravel'", "I could not find a dataset"),
    );
    let config = MatchConfig::default();
    let selector = ChatSelector::new(chat.clone(), "", config.selection.clone());
    let assessor = Assessor::new(db, MockEngine::new().with_default_score(1.0), chat, selector, config);

    let flows = vec![
        FlowRecord::new(0, "copper", 1.0),
        FlowRecord::new(1, "steel", 2.0),
        FlowRecord::new(2, "cement", 3.0),
        FlowRecord::new(3, "gravel", 4.0),
    ];
    let assessment = assessor.assess(&flows).await.unwrap();

    assert_eq!(assessment.assessed.len(), 1);
    assert_eq!(assessment.assessed[0].flow.activity, "steel");

    let report = &assessment.report;
    assert!(matches!(report.outcome(0), Some(RowOutcome::SelectionFailed { .. })));
    assert!(matches!(report.outcome(1), Some(RowOutcome::Evaluated { columns: 9, .. })));
    assert!(matches!(
        report.outcome(2),
        Some(RowOutcome::NoMatch { process_name, location }) if process_name == "cement, Portland" && location == "RoW"
    ));
    assert!(matches!(report.outcome(3), Some(RowOutcome::ParseFailed { .. })));
    assert_eq!(report.failure_count(), 3);
}

#[tokio::test]
async fn test_database_failure_aborts_the_run() {
    let assessor = Assessor::new(
        MockDatabase::new().failing(),
        MockEngine::new(),
        MockChat::new(),
        RankingSelector,
        MatchConfig::default(),
    );

    let err = assessor
        .assess(&[FlowRecord::new(0, "steel", 1.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, MatchError::Database(_)));
}

#[tokio::test]
async fn test_offline_run_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = MatchConfig::default();
    let gwp = config.methods[0].key();
    let pofp = config.methods[8].key();

    let snapshot_path = dir.path().join("db.json");
    DatabaseSnapshot::new(
        "test-db",
        vec![
            ProcessRecord::new("g1", "treatment of waste graphite, landfill", "GLO", "kg")
                .with_score(&gwp, 0.5)
                .with_score(&pofp, 0.002),
            ProcessRecord::new("g2", "graphite production, from waste", "GLO", "kg")
                .with_score(&gwp, 9.0),
            ProcessRecord::new("e1", "market group for electricity, medium voltage", "RoW", "kWh")
                .with_score(&gwp, 0.4),
            ProcessRecord::new("e2", "market for electricity, low voltage", "RoW", "kWh")
                .with_score(&gwp, 0.6),
        ],
    )
    .save(&snapshot_path)
    .unwrap();

    let flows_path = dir.path().join("flows.csv");
    std::fs::write(
        &flows_path,
        "Input/output,In/out,Notes\nWaste Graphite,2,\nElectricity,10,grid\nUnobtainium,1,\n",
    )
    .unwrap();

    let snapshot = DatabaseSnapshot::load(&snapshot_path).unwrap();
    let engine = FactorEngine::from_snapshot(&snapshot);
    let database = MemoryDatabase::from_snapshot(snapshot);
    let flows = read_flows(&flows_path, &config.columns, None).unwrap();
    let assessor = Assessor::new(database, engine, OfflineChat, RankingSelector, config);

    let assessment = assessor.assess(&flows).await.unwrap();

    let names: Vec<_> = assessment
        .assessed
        .iter()
        .map(|a| a.process.process_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "treatment of waste graphite, landfill",
            "market group for electricity, medium voltage"
        ]
    );
    assert_relative_eq!(assessment.assessed[0].impacts.get(ImpactCategory::Gwp).unwrap(), 1.0);
    assert_relative_eq!(assessment.assessed[0].impacts.get(ImpactCategory::Pofp).unwrap(), 0.004);
    assert_relative_eq!(assessment.assessed[1].impacts.get(ImpactCategory::Gwp).unwrap(), 4.0);
    // Missing factors skip columns instead of dropping the row
    assert_eq!(assessment.assessed[1].impacts.len(), 1);
    assert!(matches!(
        assessment.report.outcome(2),
        Some(RowOutcome::ParseFailed { .. })
    ));

    let out = dir.path().join("assessment.csv");
    write_assessed(&out, &assessor.config().columns, &assessment.assessed).unwrap();
    let table = std::fs::read_to_string(&out).unwrap();
    assert_eq!(table.lines().count(), 3);

    let charts = write_charts(dir.path().join("charts"), &assessment.assessed).unwrap();
    assert_eq!(charts.len(), 2);
}
