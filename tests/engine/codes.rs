// Integration tests for src/engine/types.rs: EngineCode and working memory.

use gzchunk::engine::{working_memory_size, EngineCode, LEVEL_BUF_SIZES};

const ALL: [EngineCode; 13] = [
    EngineCode::Ok,
    EngineCode::EndInput,
    EngineCode::OutOverflow,
    EngineCode::InvalidBlock,
    EngineCode::InvalidWrapper,
    EngineCode::UnsupportedMethod,
    EngineCode::IncorrectChecksum,
    EngineCode::NameOverflow,
    EngineCode::CommentOverflow,
    EngineCode::StatelessOverflow,
    EngineCode::InvalidLevel,
    EngineCode::InvalidLevelBuf,
    EngineCode::InvalidState,
];

#[test]
fn raw_values_are_unique_and_invertible() {
    let mut seen = std::collections::HashSet::new();
    for code in ALL {
        assert!(seen.insert(code.as_raw()), "duplicate raw value for {:?}", code);
        assert_eq!(EngineCode::from_raw(code.as_raw()), Some(code));
    }
}

#[test]
fn error_names_are_distinct() {
    let names: std::collections::HashSet<_> = ALL.iter().map(|c| c.error_name()).collect();
    assert_eq!(names.len(), ALL.len());
}

#[test]
fn display_carries_name_and_value() {
    assert_eq!(EngineCode::IncorrectChecksum.to_string(), "incorrect checksum (-4)");
    let boxed: Box<dyn std::error::Error> = Box::new(EngineCode::InvalidBlock);
    assert!(boxed.to_string().contains("invalid deflate block"));
}

#[test]
fn tiers_grow_with_level() {
    assert!(LEVEL_BUF_SIZES.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(working_memory_size(3), Some(LEVEL_BUF_SIZES[3]));
    assert_eq!(working_memory_size(u32::MAX), None);
}
