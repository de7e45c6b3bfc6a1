use crate::symbols::SymbolId;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("symbol table is empty")]
    EmptyTable,
    #[error("symbol {0} has zero weight")]
    ZeroWeight(SymbolId),
    #[error("symbol {0} appears more than once")]
    DuplicateSymbol(SymbolId),
    #[error("unknown symbol label: {0:?}")]
    UnknownSymbol(String),
    #[error("expected 3 reel symbols, got {0}")]
    ReelCount(usize),
    #[error("insufficient credits: have {credits}, stake is {stake}")]
    InsufficientCredits { credits: u64, stake: u64 },
    #[error("scripted draw list is empty")]
    EmptyScript,
}

pub type SlotResult<T> = Result<T, SlotError>;
