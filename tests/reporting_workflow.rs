use std::fs;

use smart_reporter::common::response::Response;
use smart_reporter::parser::parse_command;
use smart_reporter::{Config, Domain, Error, Session};

fn run(session: &mut Session, line: &str) -> Result<Response, Error> {
    let command = parse_command(line)?.expect("a command");
    session.handle(command)
}

#[test]
fn join_group_select_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let budget = dir.path().join("budget.csv");
    fs::write(&budget, "CustomerID,Budget\nC100,1200\nC200,400\nC300,50\n").unwrap();
    let report = dir.path().join("report.csv");

    let mut session = Session::new(Config::default());
    run(&mut session, &format!("load '{}' as Budget", budget.display())).unwrap();
    run(&mut session, "connect I_BillingDocument").unwrap();
    assert_eq!(
        session.store().metadata("Budget").unwrap().domain,
        Domain::Finance
    );
    assert_eq!(
        session.store().metadata("I_BillingDocument").unwrap().domain,
        Domain::Sales
    );

    match run(&mut session, "suggest I_BillingDocument Budget").unwrap() {
        Response::Suggestions { default_keys, .. } => assert_eq!(
            default_keys,
            Some(("CustomerID".to_owned(), "CustomerID".to_owned()))
        ),
        other => panic!("unexpected response {:?}", other),
    }

    match run(&mut session, "join I_BillingDocument Budget").unwrap() {
        Response::Joined { name, rows, .. } => {
            assert_eq!(name, "last_result");
            assert_eq!(rows, 3);
        }
        other => panic!("unexpected response {:?}", other),
    }
    let joined = session.store().get("last_result").unwrap();
    assert_eq!(
        joined.column_names().collect::<Vec<_>>(),
        vec!["BillingDocument", "CustomerID", "Amount", "Currency", "Budget"]
    );

    run(&mut session, "filter Currency EUR").unwrap();
    run(&mut session, "group CustomerID sum Amount").unwrap();
    match run(&mut session, "select 0").unwrap() {
        Response::Report { report, .. } => {
            let summary = report.summary.expect("a selection summary");
            assert_eq!(summary.column, "Amount_sum");
            assert_eq!(summary.rows, 1);
            assert_eq!(summary.sum, 1000.0);
            assert_eq!(summary.total, 1500.0);
            assert!((summary.percent_of_total - 66.666).abs() < 0.01);
        }
        other => panic!("unexpected response {:?}", other),
    }

    match run(&mut session, &format!("export '{}'", report.display())).unwrap() {
        Response::Exported { rows, .. } => assert_eq!(rows, 2),
        other => panic!("unexpected response {:?}", other),
    }
    assert_eq!(
        fs::read_to_string(&report).unwrap(),
        "CustomerID,Amount_sum\nC100,1000\nC200,500\n"
    );
}

#[test]
fn failed_loads_leave_the_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "not a table").unwrap();

    let mut session = Session::new(Config::default());
    run(&mut session, "connect I_BillingDocument").unwrap();

    let missing = dir.path().join("missing.csv");
    assert!(matches!(
        run(&mut session, &format!("load '{}'", missing.display())),
        Err(Error::IOError(_)) | Err(Error::CsvError(_))
    ));
    assert!(matches!(
        run(&mut session, &format!("load '{}'", notes.display())),
        Err(Error::IngestError(_))
    ));
    assert_eq!(session.store().len(), 1);
    assert!(session.store().contains("I_BillingDocument"));
}
