//! Fuzz-style sweep over the safety gate.
//!
//! Black-box hammering with randomized inputs: the gate must never panic,
//! must flag every space-surrounded denylist keyword, and must pass pure
//! alphanumeric noise that contains none.

use rand::Rng;
use rand::distributions::Alphanumeric;
use sql_chat_agent::db::guard::{DENYLIST, evaluate};

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn contains_denylisted(sql: &str) -> bool {
    let normalized = sql.trim().to_lowercase();
    DENYLIST
        .iter()
        .any(|k| normalized.starts_with(k) || normalized.contains(&format!(" {} ", k)))
}

#[test]
fn test_random_noise_never_panics() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let len = rng.gen_range(0..200);
        let sql = random_string(len);
        // Alphanumeric noise has no spaces, so only a prefix hit can fire.
        let decision = evaluate(&sql);
        assert_eq!(decision.is_allowed(), !contains_denylisted(&sql));
    }
}

#[test]
fn test_random_embeddings_always_rejected() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let keyword = DENYLIST[rng.gen_range(0..DENYLIST.len())];
        let prefix = random_string(rng.gen_range(1..30));
        let suffix = random_string(rng.gen_range(1..30));
        let sql = format!("{} {} {}", prefix, keyword, suffix);
        assert!(
            !evaluate(&sql).is_allowed(),
            "embedded keyword must be caught: {}",
            sql
        );
    }
}

#[test]
fn test_random_selects_pass() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let table = random_string(rng.gen_range(1..20));
        let column = random_string(rng.gen_range(1..20));
        let sql = format!("SELECT {} FROM {}", column, table);
        if !contains_denylisted(&sql) {
            assert!(evaluate(&sql).is_allowed(), "select must pass: {}", sql);
        }
    }
}

#[test]
fn test_weird_whitespace_and_unicode_never_panic() {
    let cases = [
        "",
        " ",
        "\n\t\r",
        "SELECT '🙂' AS emoji",
        "séleçt * from tablé",
        "\u{0}\u{1}\u{2}",
        "   select\u{a0}1",
    ];
    for sql in cases {
        let _ = evaluate(sql);
    }
}
