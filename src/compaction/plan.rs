/// One pairwise merge scheduled by [`plan_pass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeTask {
    /// (level, id) of the two input segments.
    pub inputs: [(u32, u64); 2],
    /// Level of the segment the merge produces.
    pub output_level: u32,
}

/// Plan one pass of pairwise merges over the live segments.
///
/// `segments` holds the (level, id) of every live segment. Pure function: no
/// I/O, so the schedule can be tested on its own.
///
/// - Normal pass: segments pair up with another of the same level, lowest
///   ids first. The odd one out at a level waits for more input.
/// - Forced pass: the level rule is ignored and segments pair up in
///   (level, id) order, so the smallest ones are folded together first.
///
/// A segment appears in at most one task per pass. Output level is one above
/// the higher input level.
pub fn plan_pass(segments: &[(u32, u64)], force: bool) -> Vec<MergeTask> {
    let mut sorted = segments.to_vec();
    sorted.sort_unstable();

    let mut tasks = Vec::new();
    if force {
        for pair in sorted.chunks_exact(2) {
            tasks.push(task(pair[0], pair[1]));
        }
        return tasks;
    }

    for run in sorted.chunk_by(|a, b| a.0 == b.0) {
        for pair in run.chunks_exact(2) {
            tasks.push(task(pair[0], pair[1]));
        }
    }
    tasks
}

fn task(a: (u32, u64), b: (u32, u64)) -> MergeTask {
    MergeTask {
        inputs: [a, b],
        output_level: a.0.max(b.0) + 1,
    }
}
