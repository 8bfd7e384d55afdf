//! Plain-text rendering of the board's flow field.

use std::fmt::Write as _;

use tile_defence_core::{Direction, TileContent, TileCoord};
use tile_defence_world::{Board, Tile};

/// Draws the board with north at the top, one character per tile.
///
/// Destinations are `D`, spawn points `S`, walls `#` and towers `T`; open
/// tiles show an arrow toward their next hop, or `.` when unreached.
pub(crate) fn flow_field(board: &Board) -> String {
    let mut out = String::new();
    for y in (0..board.height()).rev() {
        for x in 0..board.width() {
            let glyph = board
                .tile_index(TileCoord::new(x, y))
                .and_then(|index| board.tile(index))
                .map_or(' ', glyph);
            out.push(glyph);
        }
        let _ = writeln!(out);
    }
    out
}

fn glyph(tile: &Tile) -> char {
    match tile.content() {
        TileContent::Destination => 'D',
        TileContent::SpawnPoint => 'S',
        TileContent::Wall => '#',
        TileContent::Tower(_) => 'T',
        TileContent::Empty => match tile.path_direction() {
            Some(Direction::North) => '^',
            Some(Direction::East) => '>',
            Some(Direction::South) => 'v',
            Some(Direction::West) => '<',
            None => '.',
        },
    }
}
