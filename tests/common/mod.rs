#![allow(dead_code)]

use chess_core::{PuzzleRecord, Theme};
use chess_puzzler::{classify, normalize, NormalizedPuzzle, PlyRecord, TacticVerdict};
use curriculum::{ClassifiedPuzzle, CorpusIndex};

/// A puzzle exactly as the Lichess corpus supplies it.
pub struct LichessPuzzle {
    pub id: &'static str,
    pub fen: &'static str,
    pub moves: &'static str,
    pub themes: &'static str,
}

pub fn record(p: &LichessPuzzle) -> PuzzleRecord {
    PuzzleRecord::from_fields(p.id, p.fen, p.moves, 1500, 90, p.themes).expect("valid corpus row")
}

/// Normalize, simulate and classify one puzzle.
pub fn classify_puzzle(p: &LichessPuzzle) -> (NormalizedPuzzle, Vec<PlyRecord>, TacticVerdict) {
    let puzzle = normalize(&record(p)).unwrap_or_else(|e| panic!("{}: {e}", p.id));
    let plies = puzzle.simulate().unwrap_or_else(|e| panic!("{}: {e}", p.id));
    let verdict = classify(&puzzle, &plies);
    (puzzle, plies, verdict)
}

/// Assert that `target` is among the verdict's themes for every puzzle.
pub fn assert_theme_detected(puzzles: &[LichessPuzzle], target: Theme) {
    let mut failures = Vec::new();
    for (idx, p) in puzzles.iter().enumerate() {
        let (_, _, verdict) = classify_puzzle(p);
        let themes: Vec<&Theme> = verdict.themes().collect();
        if verdict.has_theme(&target) {
            eprintln!("  [{}/{}] {} ... ok", idx + 1, puzzles.len(), p.id);
        } else {
            eprintln!("  [{}/{}] {} ... MISS (expected {target}, got {themes:?})", idx + 1, puzzles.len(), p.id);
            failures.push(format!("  MISS {}: expected {target}, got {themes:?}", p.id));
        }
    }
    if !failures.is_empty() {
        panic!("{target}: {}/{} failed\n{}", failures.len(), puzzles.len(), failures.join("\n"));
    }
}

pub fn index_of(puzzles: &[&[LichessPuzzle]]) -> CorpusIndex {
    let records: Vec<PuzzleRecord> = puzzles.iter().flat_map(|set| set.iter().map(record)).collect();
    let (index, report) = CorpusIndex::build(&records, &Default::default());
    assert!(report.dropped.is_empty(), "unexpected drops: {:?}", report.dropped);
    index
}

pub fn classified_ids(puzzles: &[ClassifiedPuzzle]) -> Vec<&str> {
    puzzles.iter().map(|cp| cp.id()).collect()
}

// ===========================================================================
// Corpus samples (https://huggingface.co/datasets/Lichess/chess-puzzles)
// ===========================================================================

pub const SMOTHERED_MATES: [LichessPuzzle; 10] = [
    LichessPuzzle { id: "E9t7J", fen: "2r3k1/p3Q1p1/4p2p/3p4/5P2/7n/P5PP/1R3RqK w - - 7 32", moves: "f1g1 h3f2", themes: "endgame mate mateIn1 oneMove smotheredMate" },
    LichessPuzzle { id: "e7Aqy", fen: "1r2r2k/1p1R2p1/7p/p2Q4/2P5/P6n/1P4PN/2R3qK w - - 2 36", moves: "c1g1 h3f2", themes: "mate mateIn1 middlegame oneMove smotheredMate" },
    LichessPuzzle { id: "3S75t", fen: "r4r1k/p1p3pp/7N/1q3p2/3B4/P4P2/P2R1K2/6R1 b - - 3 26", moves: "f8g8 h6f7", themes: "mate mateIn1 middlegame oneMove smotheredMate" },
    LichessPuzzle { id: "43h3J", fen: "8/1p3k1p/6p1/p2N1p2/1P6/P6n/6PP/2R1R1qK w - - 9 39", moves: "e1g1 h3f2", themes: "endgame mate mateIn1 oneMove smotheredMate" },
    LichessPuzzle { id: "S7W9A", fen: "k2r4/2p5/6Q1/3p1P2/8/1P5n/P5PP/R3R1qK w - - 5 44", moves: "e1g1 h3f2", themes: "endgame mate mateIn1 oneMove smotheredMate" },
    LichessPuzzle { id: "T4R6D", fen: "2b3k1/7p/p6r/1p1N2p1/3Pnp2/1P3N2/6P1/6QK w - - 4 44", moves: "f3h2 e4g3", themes: "endgame mate mateIn1 oneMove smotheredMate" },
    LichessPuzzle { id: "bm2z9", fen: "r6k/1p6/2b1p1Q1/p3P2N/8/7n/1P4PP/5RqK w - - 7 30", moves: "f1g1 h3f2", themes: "endgame mate mateIn1 oneMove smotheredMate" },
    LichessPuzzle { id: "cGr5w", fen: "3r2k1/5p2/Q2q1p2/1p2p2p/1n5P/2P3P1/PP3P2/KN5R w - - 1 30", moves: "a6d6 b4c2", themes: "endgame mate mateIn1 oneMove smotheredMate" },
    LichessPuzzle { id: "01H4V", fen: "r5k1/6p1/2N3pp/3p4/P2P4/1P5n/6PP/5RqK w - - 7 34", moves: "f1g1 h3f2", themes: "endgame mate mateIn1 oneMove smotheredMate" },
    LichessPuzzle { id: "ZItNZ", fen: "r3r1k1/1Q1R2b1/p6p/8/2p4P/n1N3P1/PP6/Kq5R w - - 9 32", moves: "c3b1 a3c2", themes: "mate mateIn1 middlegame oneMove smotheredMate" },
];

pub const BACK_RANK_MATES: [LichessPuzzle; 10] = [
    LichessPuzzle { id: "A8d4e", fen: "k3r3/1p4Q1/7p/p7/2P5/5N2/5PPP/4q1K1 w - - 5 31", moves: "f3e1 e8e1", themes: "backRankMate endgame mate mateIn1 oneMove" },
    LichessPuzzle { id: "j4j7Y", fen: "1r4k1/5pp1/5b1p/p3p3/P2p4/5P2/3Q2PP/1q3R1K w - - 0 33", moves: "f1b1 b8b1 d2c1 b1c1", themes: "backRankMate endgame mate mateIn2 short" },
    LichessPuzzle { id: "5d03f", fen: "3q3k/6p1/7p/1Q2P3/2P5/8/3r1PPP/1R4K1 w - - 5 37", moves: "e5e6 d2d1 b1d1 d8d1", themes: "backRankMate endgame mate mateIn2 short" },
    LichessPuzzle { id: "S08O3", fen: "2r3k1/3q2p1/5n1p/R3p3/1n2P3/R7/1P3PPP/3Q2K1 w - - 0 30", moves: "d1d7 c8c1 d7d1 c1d1", themes: "backRankMate endgame mate mateIn2 short" },
    LichessPuzzle { id: "b877u", fen: "6k1/4P2p/3B2p1/8/4N3/6R1/1r2r1PP/4R2K w - - 1 42", moves: "e1e2 b2b1 e2e1 b1e1", themes: "backRankMate endgame mate mateIn2 short" },
    LichessPuzzle { id: "4Z3W8", fen: "6R1/p3k2p/8/4N3/1P1b4/P7/2r1r1PP/4R2K w - - 5 30", moves: "e1e2 c2c1 e2e1 c1e1", themes: "backRankMate endgame mate mateIn2 short" },
    LichessPuzzle { id: "0T05w", fen: "5r1k/4b1p1/2Q5/2P2r2/8/P7/6PP/R4q1K w - - 2 32", moves: "a1f1 f5f1", themes: "backRankMate endgame mate mateIn1 oneMove" },
    LichessPuzzle { id: "0Z78t", fen: "2r5/p5k1/6b1/3p4/1R6/8/P4PPP/2q1R1K1 w - - 0 45", moves: "e1c1 c8c1", themes: "backRankMate endgame mate mateIn1 oneMove" },
    LichessPuzzle { id: "C7H8o", fen: "7k/R6p/2p3n1/8/3P4/4P2r/PP6/K4R2 w - - 1 43", moves: "f1f6 h3h1 f6f1 h1f1", themes: "backRankMate endgame mate mateIn2 short" },
    LichessPuzzle { id: "f635e", fen: "8/2r3k1/2B1R1p1/7p/P7/8/1P3PPP/6K1 w - - 0 44", moves: "c6d5 c7c1 e6e1 c1e1", themes: "backRankMate endgame mate mateIn2 short" },
];

pub const KNIGHT_FORKS: [LichessPuzzle; 3] = [
    LichessPuzzle { id: "2FoRk", fen: "8/8/6k1/1q3P2/4N1pp/8/5RK1/8 b - - 0 60", moves: "g6f7 e4d6 f7f6 d6b5", themes: "crushing endgame fork short" },
    LichessPuzzle { id: "f67P5", fen: "r2k4/5R2/4p1p1/p1B5/2P1n1P1/7P/5K2/8 w - - 1 40", moves: "f2f3 e4g5 f3e3 g5f7", themes: "advantage endgame fork short" },
    LichessPuzzle { id: "r11X9", fen: "8/6N1/6b1/7p/7P/5k1K/8/8 w - - 3 56", moves: "g7e6 g6f5 h3h2 f5e6", themes: "crushing endgame fork short" },
];
