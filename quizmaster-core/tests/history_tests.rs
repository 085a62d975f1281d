use quizmaster_core::{summarize_history, MemoryLedger, ResultsLedger, RoundSummary};

#[tokio::test]
async fn append_preserves_order_per_quiz() {
    let ledger = MemoryLedger::new();
    let s1 = RoundSummary::new(1, 2, 1, 50.0);
    let s2 = RoundSummary::new(2, 3, 3, 100.0);
    ledger.append("exam1", &s1).await.unwrap();
    ledger.append("other", &s1).await.unwrap();
    ledger.append("exam1", &s2).await.unwrap();

    assert_eq!(ledger.load("exam1").await, vec![s1.clone(), s2]);
    assert_eq!(ledger.load("other").await, vec![s1]);
    assert!(ledger.load("unknown_quiz").await.is_empty());
    assert_eq!(ledger.quiz_ids().await, vec!["exam1".to_string(), "other".to_string()]);
}

#[test]
fn history_stats() {
    let history = vec![
        RoundSummary::new(1, 4, 2, 50.0),
        RoundSummary::new(2, 5, 4, 80.0),
        RoundSummary::new(3, 4, 3, 75.0),
    ];
    let stats = summarize_history(&history);
    assert_eq!(stats.rounds, 3);
    assert_eq!(stats.best_score, 80.0);
    assert_eq!(stats.last_score, 75.0);
    assert!((stats.average_score - 68.333).abs() < 0.01);
    assert_eq!(stats.mastered_rounds, 1);
    assert_eq!(stats.questions, 13);
    assert!((stats.accuracy() - 9.0 / 13.0).abs() < 1e-9);

    assert_eq!(summarize_history(&[]).rounds, 0);
}
