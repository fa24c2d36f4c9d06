//! Hand skeleton as draw commands, plus a coarse character raster for the terminal.

use crate::landmark::{Hand, idx::*};

/// Bones between landmarks (MediaPipe `HAND_CONNECTIONS`)
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, RING_MCP), (RING_MCP, PINKY_MCP),
    (WRIST, PINKY_MCP),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    /// Connector between two landmarks, in surface coordinates
    Line { from: (f32, f32), to: (f32, f32) },
    /// A landmark dot
    Point { at: (f32, f32) },
}

/// Connectors first, then points, scaled to a `width` x `height` surface.
pub fn draw_commands(hand: &Hand, width: f32, height: f32) -> Vec<DrawCommand> {
    let scale = |i: usize| {
        let p = hand.point(i);
        (p.x * width, p.y * height)
    };

    let lines = HAND_CONNECTIONS.iter().map(|&(a, b)| DrawCommand::Line {
        from: scale(a),
        to: scale(b),
    });
    let points = (0..hand.landmarks.len()).map(|i| DrawCommand::Point { at: scale(i) });

    lines.chain(points).collect()
}

/// Rasterize draw commands onto a `cols` x `rows` character grid.
///
/// Lines are sampled, points drawn as `o` on top of `.` connectors. Sampling is capped
/// at the grid size, so off-grid coordinates cost no more than on-grid ones.
pub fn rasterize(commands: &[DrawCommand], cols: usize, rows: usize) -> Vec<String> {
    let max_steps = cols + rows;
    let mut grid = vec![vec![' '; cols]; rows];
    let mut plot = |x: f32, y: f32, c: char| {
        if !(x >= 0.0 && y >= 0.0) {
            return;
        }
        let (cx, cy) = (x.round() as usize, y.round() as usize);
        if cx < cols && cy < rows && (c == 'o' || grid[cy][cx] == ' ') {
            grid[cy][cx] = c;
        }
    };

    for cmd in commands {
        if let DrawCommand::Line { from, to } = *cmd {
            let span = (to.0 - from.0).abs().max((to.1 - from.1).abs());
            let steps = (span.ceil() as usize).clamp(1, max_steps.max(1));
            for s in 0..=steps {
                let t = s as f32 / steps as f32;
                plot(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t, '.');
            }
        }
    }
    for cmd in commands {
        if let DrawCommand::Point { at } = *cmd {
            plot(at.0, at.1, 'o');
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect()
}
