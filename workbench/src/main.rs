use std::{
    fmt, fs,
    io::{self, BufRead, Write},
};

use clap::{App, Arg};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use workgrid::board::{BoardConfig, GridCoord, WorldPoint};
use workgrid::engine::{CannotPlaceReason, CannotRemoveReason, PlacementEngine};
use workgrid::pieces::{CellShape, Footprint, PieceKind, PieceSpec, Rotation};

type Engine = PlacementEngine<String, String, CellShape>;

fn main() -> io::Result<()> {
    let matches = App::new("Workbench")
        .version("1.0")
        .author("Zachary Stewart <zachary@zstewart.com>")
        .about("Interactive sandbox for the workgrid placement engine.")
        .arg(
            Arg::with_name("layout")
                .short("l")
                .long("layout")
                .value_name("FILE")
                .help("load the shop board from a JSON layout file")
                .takes_value(true),
        )
        .get_matches();

    let shop_config = match matches.value_of("layout") {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            match BoardConfig::from_json(&json) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("bad layout {}: {}", path, err);
                    std::process::exit(1);
                }
            }
        }
        None => demo_shop(),
    };

    let mut engine = Engine::new();
    // Layout problems are fatal here, before any interaction.
    engine
        .add_board("shop".to_string(), &shop_config, WorldPoint::ORIGIN)
        .expect("shop layout was already validated");
    engine
        .add_board(
            "annex".to_string(),
            &demo_annex(),
            WorldPoint::new(32.0, 0.0, 0.0),
        )
        .expect("annex layout is static");

    let stdin = std::io::stdin();
    let mut input = InputReader::new(stdin.lock());
    let mut rng = rand::thread_rng();

    println!("Workbench sandbox. Type help or ? for commands.");
    loop {
        println!();
        let active = engine.active().cloned().expect("boards were added above");
        println!("Board {} ({:.1}% filled):", active, engine.fill_percentage(&active));
        show_board(&engine, &active);

        let cmd = read_command(&mut input)?;
        match cmd {
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Boards => {
                for key in engine.boards() {
                    let marker = if Some(key) == engine.active() { "*" } else { " " };
                    println!("{} {}", marker, key);
                }
            }
            Command::Switch(board) => {
                if !engine.set_active(board.clone()) {
                    println!("No board named {}.", board);
                }
            }
            Command::Spawn(stock, name) => match engine.add_piece(name, stock.spec()) {
                Ok(()) => {}
                Err(err) => println!("A piece named {} already exists.", err.id()),
            },
            Command::Place(name, origin, rotation) => {
                match engine.place(&name, origin, rotation, &active) {
                    Ok(()) => {}
                    Err(err) => match err.reason() {
                        CannotPlaceReason::UnknownPiece => {
                            println!("No piece named {}. Spawn it first.", name)
                        }
                        CannotPlaceReason::UnknownBoard => println!("No such board."),
                        CannotPlaceReason::OutOfBounds => {
                            println!("Invalid placement: footprint leaves the board.")
                        }
                        CannotPlaceReason::Occupied => {
                            println!("Invalid placement: overlaps a placed piece.")
                        }
                        CannotPlaceReason::NotBuildable => {
                            println!("Invalid placement: covers a dead cell.")
                        }
                        CannotPlaceReason::NotLocked => {
                            println!("Invalid placement: tools only go on locked cells.")
                        }
                        CannotPlaceReason::InfrastructurePresent => {
                            println!("Invalid placement: another tool is already there.")
                        }
                    },
                }
            }
            Command::Remove(name) => match engine.remove(&name) {
                Ok(_) => {}
                Err(err) => match err.reason() {
                    CannotRemoveReason::UnknownPiece => println!("No piece named {}.", name),
                    CannotRemoveReason::NotPlaced => println!("{} is not on a board.", name),
                    CannotRemoveReason::NoBoard => println!("{} has no board to leave.", name),
                },
            },
            Command::Lift(name) => lift_tool(&mut engine, &name),
            Command::Scatter => scatter(&mut engine, &active, &mut rng),
            Command::Pieces => {
                for (id, piece) in engine.iter_pieces() {
                    let status = match piece.placement() {
                        Some(placement) => format!(
                            "at {},{} on {}",
                            placement.origin().x,
                            placement.origin().z,
                            piece.board().map(String::as_str).unwrap_or("?"),
                        ),
                        None => "in hand".to_string(),
                    };
                    println!("{} ({:?}) {}", id, piece.kind(), status);
                }
            }
        }
    }
    Ok(())
}

enum Command {
    Quit,
    Help,
    Boards,
    Pieces,
    Scatter,
    Switch(String),
    Spawn(Stock, String),
    Place(String, GridCoord, Rotation),
    Remove(String),
    Lift(String),
}

/// Read and parse one command, reprompting until valid.
fn read_command<B: BufRead>(input: &mut InputReader<B>) -> io::Result<Command> {
    /// Matchers for commands with args.
    static SPAWN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?:spawn|new)\s+(?P<stock>\w+)\s+(?P<name>\w+)$").unwrap()
    });
    static PLACE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^(?x)(?:place|put)\s+
        (?P<name>\w+)\s+
        (?:(?:at|on|to|->|=>)\s+)?
        (?P<x>-?[0-9]+)(?:\s*,\s*|\s+)(?P<z>-?[0-9]+)
        (?:\s+r?(?P<rot>0|90|180|270))?$",
        )
        .unwrap()
    });
    static REMOVE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?:un-?place|remove)\s+(?P<name>\w+)$").unwrap());
    static LIFT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?:lift|pick\s*up)\s+(?P<name>\w+)$").unwrap());
    static SWITCH: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?:switch|board)\s+(?P<board>\w+)$").unwrap());

    input.read_input_lower("> ", |line| match line {
        "?" | "help" | "h" => Some(Command::Help),
        "quit" | "exit" | "q" => Some(Command::Quit),
        "boards" => Some(Command::Boards),
        "pieces" => Some(Command::Pieces),
        "scatter" | "random" | "rand" => Some(Command::Scatter),
        other => {
            if let Some(captures) = SPAWN.captures(other) {
                let stock = match Stock::parse(captures.name("stock").unwrap().as_str()) {
                    Some(stock) => stock,
                    None => {
                        print!("invalid stock, choose");
                        for stock in Stock::ALL {
                            print!(" {}", StockName(*stock));
                        }
                        println!();
                        return None;
                    }
                };
                Some(Command::Spawn(
                    stock,
                    captures.name("name").unwrap().as_str().to_string(),
                ))
            } else if let Some(captures) = PLACE.captures(other) {
                let x = match captures.name("x").unwrap().as_str().parse() {
                    Ok(x) => x,
                    Err(_) => {
                        println!("invalid x coordinate");
                        return None;
                    }
                };
                let z = match captures.name("z").unwrap().as_str().parse() {
                    Ok(z) => z,
                    Err(_) => {
                        println!("invalid z coordinate");
                        return None;
                    }
                };
                let rotation = match captures.name("rot").map(|m| m.as_str()) {
                    None | Some("0") => Rotation::R0,
                    Some("90") => Rotation::R90,
                    Some("180") => Rotation::R180,
                    Some("270") => Rotation::R270,
                    // The regex only admits the four values above.
                    Some(_) => unreachable!(),
                };
                Some(Command::Place(
                    captures.name("name").unwrap().as_str().to_string(),
                    GridCoord::new(x, z),
                    rotation,
                ))
            } else if let Some(captures) = REMOVE.captures(other) {
                Some(Command::Remove(
                    captures.name("name").unwrap().as_str().to_string(),
                ))
            } else if let Some(captures) = LIFT.captures(other) {
                Some(Command::Lift(
                    captures.name("name").unwrap().as_str().to_string(),
                ))
            } else if let Some(captures) = SWITCH.captures(other) {
                Some(Command::Switch(
                    captures.name("board").unwrap().as_str().to_string(),
                ))
            } else {
                println!("Invalid command \"{}\". Use '?' for help", other);
                None
            }
        }
    })
}

/// Run the support check for a tool and take it off the board together
/// with its passengers.
fn lift_tool(engine: &mut Engine, name: &str) {
    let name = name.to_string();
    match engine.get_piece(&name) {
        None => {
            println!("No piece named {}.", name);
            return;
        }
        Some(piece) if piece.kind() != PieceKind::Tool => {
            println!("{} is not a tool; use remove.", name);
            return;
        }
        Some(_) => {}
    }
    match engine.tool_lift_passengers(&name) {
        None => println!("Cannot lift {}: something rests partly off of it.", name),
        Some(passengers) => {
            for passenger in &passengers {
                let _ = engine.remove(passenger);
            }
            let _ = engine.remove(&name);
            if passengers.is_empty() {
                println!("Lifted {}.", name);
            } else {
                println!("Lifted {} with passengers: {}.", name, passengers.join(", "));
            }
        }
    }
}

/// Randomly place every piece still in hand on the given board.
fn scatter(engine: &mut Engine, board: &str, rng: &mut impl Rng) {
    let board = board.to_string();
    let (width, height) = {
        let grid = engine.get_board(board.as_str()).expect("active board exists").grid();
        (grid.width() as i32, grid.height() as i32)
    };
    if width == 0 || height == 0 {
        println!("The board is empty.");
        return;
    }
    let in_hand: Vec<(String, (u32, u32))> = engine
        .iter_pieces()
        .filter(|(_, piece)| !piece.placed())
        .map(|(id, piece)| (id.clone(), piece.shape().max_dimensions()))
        .collect();
    for (name, dims) in in_hand {
        for _ in 0..100 {
            let rotation = rng.gen();
            let origin = match random_origin(rng, dims, rotation, width, height) {
                Some(origin) => origin,
                None => break,
            };
            if engine.place(&name, origin, rotation, &board).is_ok() {
                break;
            }
        }
        if !engine.get_piece(&name).map_or(false, |piece| piece.placed()) {
            println!("No room found for {}.", name);
        }
    }
}

/// Pick a random origin whose rotated bounding box stays on the board, or
/// `None` when the piece cannot fit at all. The footprint pivots about its
/// origin cell, so the search window shifts by the rotated minimum corner.
fn random_origin(
    rng: &mut impl Rng,
    dims: (u32, u32),
    rotation: Rotation,
    width: i32,
    height: i32,
) -> Option<GridCoord> {
    let (fw, fh) = (dims.0 as i32, dims.1 as i32);
    let (ext_x, ext_z) = match rotation {
        Rotation::R0 | Rotation::R180 => (fw, fh),
        Rotation::R90 | Rotation::R270 => (fh, fw),
    };
    if ext_x > width || ext_z > height {
        return None;
    }
    let (min_x, min_z) = match rotation {
        Rotation::R0 => (0, 0),
        Rotation::R90 => (0, -(fw - 1)),
        Rotation::R180 => (-(fw - 1), -(fh - 1)),
        Rotation::R270 => (-(fh - 1), 0),
    };
    Some(GridCoord::new(
        rng.gen_range(0, width - ext_x + 1) - min_x,
        rng.gen_range(0, height - ext_z + 1) - min_z,
    ))
}

/// Print out the board. Each cell shows its strongest layer: a placed
/// piece's abbreviated name, a tool's infrastructure marker, the locked
/// marker, or the bare floor.
fn show_board(engine: &Engine, board: &str) {
    let board = match engine.get_board(board) {
        Some(board) => board,
        None => return,
    };
    let grid = board.grid();
    print!("   ");
    for x in 0..grid.width() {
        print!("{:^4}", x);
    }
    println!();
    for z in 0..grid.height() {
        print!("{:>2} ", z);
        for x in 0..grid.width() {
            // Every coordinate in range has a cell.
            let cell = board.cell(GridCoord::new(x as i32, z as i32)).unwrap();
            let glyph = if let Some(piece) = cell.placed() {
                Abbrev(piece.as_str()).to_string()
            } else if let Some(tool) = cell.infrastructure() {
                format!("={}", Abbrev(tool.as_str()))
            } else if cell.is_locked() {
                "##".to_string()
            } else if cell.is_buildable() {
                "__".to_string()
            } else {
                "..".to_string()
            };
            print!("{:^4}", glyph);
        }
        println!();
    }
}

fn print_help() {
    println!(
        "Available Commands:
    spawn <stock> <name>            create a piece of the given stock shape.
    place <name> <x>,<z> [<rot>]    place the piece at the coordinate, optionally
        rotated. Rotations are 0, 90, 180, or 270 degrees clockwise.
    remove <name>                   take the piece off its board.
    lift <name>                     pick up a tool together with whatever rests
        entirely on it. Refused if something hangs off the edge.
    scatter                         randomly place every piece still in hand.
    pieces                          list spawned pieces and where they are.
    boards / switch <board>         list boards, or change the active board.
    quit                            leave the sandbox.

Available Stock:"
    );
    for stock in Stock::ALL {
        println!("    {:<8} {}", StockName(*stock), stock.blurb());
    }
}

/// Stock shapes available in the sandbox.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Stock {
    /// 1x1 ordinary piece.
    Block,
    /// 2x1 ordinary piece.
    Slab,
    /// 2x2 ordinary piece.
    Plate,
    /// L-shaped three-cell ordinary piece.
    Angle,
    /// 1x1 obstacle.
    Crate,
    /// 2x2 tool.
    Bench,
    /// 3x1 tool.
    Jig,
}

impl Stock {
    const ALL: &'static [Stock] = &[
        Stock::Block,
        Stock::Slab,
        Stock::Plate,
        Stock::Angle,
        Stock::Crate,
        Stock::Bench,
        Stock::Jig,
    ];

    fn parse(name: &str) -> Option<Stock> {
        match name {
            "block" => Some(Stock::Block),
            "slab" => Some(Stock::Slab),
            "plate" => Some(Stock::Plate),
            "angle" | "l" => Some(Stock::Angle),
            "crate" | "obstacle" => Some(Stock::Crate),
            "bench" => Some(Stock::Bench),
            "jig" => Some(Stock::Jig),
            _ => None,
        }
    }

    fn spec(self) -> PieceSpec<CellShape> {
        match self {
            Stock::Block => PieceSpec::new(CellShape::single(), PieceKind::Normal),
            Stock::Slab => PieceSpec::new(CellShape::rect(2, 1), PieceKind::Normal),
            Stock::Plate => PieceSpec::new(CellShape::rect(2, 2), PieceKind::Normal),
            Stock::Angle => {
                // The three-cell corner; CellShape::new only fails on empty
                // or duplicate data.
                let shape = CellShape::new(vec![
                    GridCoord::new(0, 0),
                    GridCoord::new(1, 0),
                    GridCoord::new(0, 1),
                ])
                .unwrap();
                PieceSpec::new(shape, PieceKind::Normal)
            }
            Stock::Crate => PieceSpec::new(CellShape::single(), PieceKind::Normal).obstacle(),
            Stock::Bench => PieceSpec::new(CellShape::rect(2, 2), PieceKind::Tool),
            Stock::Jig => PieceSpec::new(CellShape::rect(3, 1), PieceKind::Tool),
        }
    }

    fn blurb(self) -> &'static str {
        match self {
            Stock::Block => "1x1 piece",
            Stock::Slab => "2x1 piece",
            Stock::Plate => "2x2 piece",
            Stock::Angle => "L-shaped piece",
            Stock::Crate => "1x1 obstacle, blocks cells but never counts as fill",
            Stock::Bench => "2x2 tool, unlocks the cells it covers",
            Stock::Jig => "3x1 tool, unlocks the cells it covers",
        }
    }
}

/// Display helper that prints a stock shape's name.
struct StockName(Stock);

impl fmt::Display for StockName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self.0 {
            Stock::Block => "block",
            Stock::Slab => "slab",
            Stock::Plate => "plate",
            Stock::Angle => "angle",
            Stock::Crate => "crate",
            Stock::Bench => "bench",
            Stock::Jig => "jig",
        };
        f.pad(name)
    }
}

/// Display helper that prints the first two characters of a piece name.
struct Abbrev<'a>(&'a str);

impl fmt::Display for Abbrev<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut chars = self.0.chars();
        let first = chars.next().unwrap_or('?');
        match chars.next() {
            Some(second) => write!(f, "{}{}", first, second),
            None => write!(f, "{} ", first),
        }
    }
}

/// The built-in shop: an 8x6 floor, fully buildable, with a locked 2x2
/// patch in the corner for tools.
fn demo_shop() -> BoardConfig {
    let mut buildable = Vec::new();
    for z in 0..6 {
        for x in 0..8 {
            buildable.push(GridCoord::new(x, z));
        }
    }
    BoardConfig {
        width: 8,
        height: 6,
        cell_size: 1.0,
        buildable,
        locked: vec![
            GridCoord::new(0, 0),
            GridCoord::new(1, 0),
            GridCoord::new(0, 1),
            GridCoord::new(1, 1),
        ],
    }
}

/// The annex: a plain 4x4 overflow surface.
fn demo_annex() -> BoardConfig {
    let mut buildable = Vec::new();
    for z in 0..4 {
        for x in 0..4 {
            buildable.push(GridCoord::new(x, z));
        }
    }
    BoardConfig {
        width: 4,
        height: 4,
        cell_size: 1.0,
        buildable,
        locked: Vec::new(),
    }
}

/// Helper to read input from the player.
struct InputReader<B> {
    read: B,
    buf: String,
}

impl<B> InputReader<B> {
    fn new(read: B) -> Self {
        Self {
            read,
            buf: String::new(),
        }
    }
}

impl<B: BufRead> InputReader<B> {
    /// Repeatedly tries to read input until the input checker returns
    /// `Some`. Converts to ascii lower before running the checker.
    fn read_input_lower<F, T>(&mut self, prompt: &str, mut checker: F) -> io::Result<T>
    where
        F: FnMut(&str) -> Option<T>,
    {
        loop {
            self.read_input_inner(prompt)?;
            self.buf.make_ascii_lowercase();
            if let Some(val) = checker(self.buf.trim()) {
                return Ok(val);
            }
        }
    }

    /// Helper to print the prompt, clear the string buffer and read a line.
    fn read_input_inner(&mut self, prompt: &str) -> io::Result<()> {
        print!("{} ", prompt);
        io::stdout().flush()?;
        self.buf.clear();
        if (self.read.read_line(&mut self.buf))? == 0 {
            println!();
            std::process::exit(0);
        }
        Ok(())
    }
}
