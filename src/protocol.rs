// Engine turn protocol
//
// The engine speaks whitespace-separated integers, one message per line:
//
//   init:  <constants json>
//          <num_players> <my_id>
//          <player_id> <shipyard_x> <shipyard_y>        (per player)
//          <width> <height>
//          <halite> * width                              (per row)
//   frame: <turn>
//          <player_id> <num_ships> <num_dropoffs> <halite>   (per player)
//            <ship_id> <x> <y> <halite>                      (per ship)
//            <dropoff_id> <x> <y>                            (per dropoff)
//          <update_count>
//          <x> <y> <halite>                                  (per update)
//
// We answer the init with our name and every frame with one line of commands.

use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::error::ProtocolError;
use crate::types::{
    Command, Dropoff, GameConstants, Player, PlayerId, Position, TurnSnapshot, Unit, UnitId,
};

/// Everything the engine sends before the first turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInit {
    pub constants: GameConstants,
    pub my_id: PlayerId,
    /// Players in engine order with their shipyard
    pub shipyards: Vec<(PlayerId, Position)>,
    pub width: i32,
    pub height: i32,
    pub halite: Vec<u32>,
}

/// Game state that persists between frames. Frames only carry halite deltas
#[derive(Debug, Clone)]
pub struct Session {
    pub my_id: PlayerId,
    pub width: i32,
    pub height: i32,
    halite: Vec<u32>,
    shipyards: Vec<(PlayerId, Position)>,
}

impl Session {
    pub fn new(init: &GameInit) -> Self {
        Session {
            my_id: init.my_id,
            width: init.width,
            height: init.height,
            halite: init.halite.clone(),
            shipyards: init.shipyards.clone(),
        }
    }

    pub fn num_players(&self) -> usize {
        self.shipyards.len()
    }

    fn shipyard_of(&self, id: PlayerId) -> Option<Position> {
        self.shipyards
            .iter()
            .find(|(player, _)| *player == id)
            .map(|&(_, position)| position)
    }

    fn set_halite(&mut self, x: u32, y: u32, amount: u32) -> Result<(), ProtocolError> {
        if x as i64 >= self.width as i64 || y as i64 >= self.height as i64 {
            return Err(ProtocolError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let idx = (y as i64 * self.width as i64 + x as i64) as usize;
        self.halite[idx] = amount;
        Ok(())
    }
}

/// Reads engine messages from any async line source (stdin in production)
pub struct ProtocolReader<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> ProtocolReader<R> {
    pub fn new(reader: R) -> Self {
        ProtocolReader {
            lines: reader.lines(),
        }
    }

    async fn next_line(&mut self) -> Result<String, ProtocolError> {
        match self.lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(ProtocolError::UnexpectedEof),
        }
    }

    pub async fn read_init(&mut self) -> Result<GameInit, ProtocolError> {
        let constants: GameConstants = serde_json::from_str(&self.next_line().await?)?;

        let [num_players, my_id] = parse_fields::<2>(&self.next_line().await?)?;
        if num_players == 0 || num_players > MAX_PLAYERS {
            return Err(ProtocolError::PlayerCount(num_players));
        }

        let mut shipyards = Vec::with_capacity(num_players as usize);
        for _ in 0..num_players {
            let line = self.next_line().await?;
            let [id, x, y] = parse_fields::<3>(&line)?;
            shipyards.push((PlayerId(id), position(x, y, &line)?));
        }

        let [width, height] = parse_fields::<2>(&self.next_line().await?)?;
        let cells = map_cells(width, height)?;

        let mut halite = Vec::with_capacity(cells);
        for _ in 0..height {
            let line = self.next_line().await?;
            halite.extend(parse_row(&line, width as usize)?);
        }

        debug!(
            "Init: {} players, map {}x{}, constants {:?}",
            num_players, width, height, constants
        );

        Ok(GameInit {
            constants,
            my_id: PlayerId(my_id),
            shipyards,
            // Both sides are bounded by MAX_MAP_SIDE
            width: width as i32,
            height: height as i32,
            halite,
        })
    }

    /// Reads one frame and applies its halite updates to `session`.
    /// Returns `None` when the engine closes the stream between frames
    pub async fn read_frame(
        &mut self,
        session: &mut Session,
    ) -> Result<Option<TurnSnapshot>, ProtocolError> {
        let turn_line = match self.lines.next_line().await? {
            Some(line) => line,
            None => return Ok(None),
        };
        let [turn] = parse_fields::<1>(&turn_line)?;

        let mut players = Vec::with_capacity(session.num_players());
        for _ in 0..session.num_players() {
            let [id, num_ships, num_dropoffs, halite] =
                parse_fields::<4>(&self.next_line().await?)?;
            let id = PlayerId(id);
            let shipyard = session
                .shipyard_of(id)
                .ok_or(ProtocolError::UnknownPlayer(id))?;

            // Counts come from the wire, so nothing is preallocated from them
            let mut units = Vec::new();
            for _ in 0..num_ships {
                let line = self.next_line().await?;
                let [unit_id, x, y, cargo] = parse_fields::<4>(&line)?;
                units.push(Unit {
                    id: UnitId(unit_id),
                    owner: id,
                    position: position(x, y, &line)?,
                    halite: cargo,
                });
            }

            let mut dropoffs = Vec::new();
            for _ in 0..num_dropoffs {
                let line = self.next_line().await?;
                let [dropoff_id, x, y] = parse_fields::<3>(&line)?;
                dropoffs.push(Dropoff {
                    id: dropoff_id,
                    position: position(x, y, &line)?,
                });
            }

            players.push(Player {
                id,
                halite,
                shipyard,
                dropoffs,
                units,
            });
        }

        let [update_count] = parse_fields::<1>(&self.next_line().await?)?;
        for _ in 0..update_count {
            let [x, y, amount] = parse_fields::<3>(&self.next_line().await?)?;
            session.set_halite(x, y, amount)?;
        }

        Ok(Some(TurnSnapshot {
            turn,
            my_id: session.my_id,
            width: session.width,
            height: session.height,
            halite: session.halite.clone(),
            players,
        }))
    }
}

/// Space-separated command line for one turn
pub fn format_commands(commands: &[Command]) -> String {
    commands
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Writes one line and flushes; the engine waits for the newline
pub async fn send_line<W: AsyncWrite + Unpin>(
    writer: &mut W,
    line: &str,
) -> Result<(), ProtocolError> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Largest accepted map side. Real games are at most 64x64
const MAX_MAP_SIDE: u32 = 1024;
const MAX_PLAYERS: u32 = 16;

fn map_cells(width: u32, height: u32) -> Result<usize, ProtocolError> {
    let in_range = |side: u32| side > 0 && side <= MAX_MAP_SIDE;
    if !in_range(width) || !in_range(height) {
        return Err(ProtocolError::Dimensions { width, height });
    }
    width
        .checked_mul(height)
        .map(|cells| cells as usize)
        .ok_or(ProtocolError::Dimensions { width, height })
}

fn coordinate(value: u32, line: &str) -> Result<i32, ProtocolError> {
    i32::try_from(value).map_err(|_| ProtocolError::InvalidNumber {
        token: value.to_string(),
        line: line.to_string(),
    })
}

fn position(x: u32, y: u32, line: &str) -> Result<Position, ProtocolError> {
    Ok(Position::new(coordinate(x, line)?, coordinate(y, line)?))
}

fn parse_number(token: &str, line: &str) -> Result<u32, ProtocolError> {
    token.parse().map_err(|_| ProtocolError::InvalidNumber {
        token: token.to_string(),
        line: line.to_string(),
    })
}

fn parse_fields<const N: usize>(line: &str) -> Result<[u32; N], ProtocolError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != N {
        return Err(ProtocolError::FieldCount {
            expected: N,
            found: tokens.len(),
            line: line.to_string(),
        });
    }

    let mut fields = [0u32; N];
    for (slot, token) in fields.iter_mut().zip(tokens) {
        *slot = parse_number(token, line)?;
    }
    Ok(fields)
}

fn parse_row(line: &str, width: usize) -> Result<Vec<u32>, ProtocolError> {
    let row = line
        .split_whitespace()
        .map(|token| parse_number(token, line))
        .collect::<Result<Vec<_>, _>>()?;

    if row.len() != width {
        return Err(ProtocolError::FieldCount {
            expected: width,
            found: row.len(),
            line: line.to_string(),
        });
    }
    Ok(row)
}
