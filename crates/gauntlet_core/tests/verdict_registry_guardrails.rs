use std::collections::HashMap;

use gauntlet_core::verdict::{self, VERDICTS, VerdictKind, VerdictStage};

const ALL_KINDS: &[VerdictKind] = &[
    VerdictKind::Success,
    VerdictKind::WrongReturnCode,
    VerdictKind::AssertionFailed,
    VerdictKind::Timeout,
    VerdictKind::StderrEmpty,
    VerdictKind::StderrNotEmpty,
    VerdictKind::TypeError,
    VerdictKind::InvalidFormat,
];

#[test]
fn every_kind_has_exactly_one_registry_entry() {
    for &kind in ALL_KINDS {
        let count = VERDICTS.iter().filter(|v| v.id == kind).count();
        assert_eq!(count, 1, "verdict {:?} registered {} times", kind, count);
    }
    assert_eq!(VERDICTS.len(), ALL_KINDS.len());
}

#[test]
fn verdict_spellings_unique() {
    let mut seen: HashMap<&'static str, VerdictKind> = HashMap::new();

    for info in VERDICTS {
        assert_eq!(info.id.label(), info.label);
        assert_eq!(info.id.ident(), info.ident);

        for spelling in [info.label, info.ident] {
            if let Some(prev) = seen.insert(spelling, info.id) {
                assert_eq!(
                    prev, info.id,
                    "duplicate verdict spelling {:?}: {:?} and {:?}",
                    spelling, prev, info.id
                );
            }
        }
    }
}

#[test]
fn stages_partition_the_taxonomy() {
    assert_eq!(verdict::stage(VerdictKind::Timeout), VerdictStage::Runner);
    assert_eq!(verdict::stage(VerdictKind::WrongReturnCode), VerdictStage::Precondition);
    assert_eq!(verdict::stage(VerdictKind::StderrEmpty), VerdictStage::Precondition);
    assert_eq!(verdict::stage(VerdictKind::InvalidFormat), VerdictStage::Checker);
    for &kind in ALL_KINDS {
        assert_eq!(kind.stage(), verdict::stage(kind));
    }
}
