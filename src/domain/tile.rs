/// Cell and occupant types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.
///
/// ## Map symbols
///   '#' = Wall                 '.' = Floor
///   'C' = Destination          '@' = Player on floor
///   '&' = Player on destination
///   'c' = Crate on floor       '$' = Crate on destination

/// What may stand on an occupiable cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Occupant {
    Player,
    Crate,
}

/// One grid position. A wall carries no occupant slot at all,
/// so "wall holding a crate" cannot be expressed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Cell {
    Wall,
    Floor(Option<Occupant>),
    DestinationFloor(Option<Occupant>),
}

impl Cell {
    /// Empty plain floor.
    pub const FLOOR: Cell = Cell::Floor(None);
    /// Empty destination.
    pub const DESTINATION: Cell = Cell::DestinationFloor(None);

    /// Decode a map symbol. `None` for anything outside the symbol table.
    pub fn from_symbol(ch: char) -> Option<Cell> {
        let cell = match ch {
            '#' => Cell::Wall,
            '.' => Cell::Floor(None),
            'C' => Cell::DestinationFloor(None),
            '@' => Cell::Floor(Some(Occupant::Player)),
            '&' => Cell::DestinationFloor(Some(Occupant::Player)),
            'c' => Cell::Floor(Some(Occupant::Crate)),
            '$' => Cell::DestinationFloor(Some(Occupant::Crate)),
            _ => return None,
        };
        Some(cell)
    }

    /// Encode as a map symbol (inverse of `from_symbol`).
    pub fn symbol(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Floor(None) => '.',
            Cell::DestinationFloor(None) => 'C',
            Cell::Floor(Some(Occupant::Player)) => '@',
            Cell::DestinationFloor(Some(Occupant::Player)) => '&',
            Cell::Floor(Some(Occupant::Crate)) => 'c',
            Cell::DestinationFloor(Some(Occupant::Crate)) => '$',
        }
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Cell::Wall)
    }

    /// Can an occupant ever stand here?
    pub fn is_occupiable(self) -> bool {
        !self.is_wall()
    }

    /// Is this a goal cell (regardless of occupant)?
    pub fn is_destination(self) -> bool {
        matches!(self, Cell::DestinationFloor(_))
    }

    /// Current occupant. Always `None` for walls.
    pub fn occupant(self) -> Option<Occupant> {
        match self {
            Cell::Wall => None,
            Cell::Floor(o) | Cell::DestinationFloor(o) => o,
        }
    }

    /// Occupiable and nobody standing on it.
    pub fn is_vacant(self) -> bool {
        self.is_occupiable() && self.occupant().is_none()
    }

    pub fn has_crate(self) -> bool {
        self.occupant() == Some(Occupant::Crate)
    }

    pub fn has_player(self) -> bool {
        self.occupant() == Some(Occupant::Player)
    }

    /// Same underlying floor with a different occupant.
    /// Walls are returned unchanged: they never take an occupant.
    pub(crate) fn with_occupant(self, occupant: Option<Occupant>) -> Cell {
        match self {
            Cell::Wall => Cell::Wall,
            Cell::Floor(_) => Cell::Floor(occupant),
            Cell::DestinationFloor(_) => Cell::DestinationFloor(occupant),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::FLOOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYMBOLS: &str = "#.C@&c$";

    #[test]
    fn every_symbol_decodes_and_encodes_back() {
        for ch in SYMBOLS.chars() {
            let cell = Cell::from_symbol(ch).expect("known symbol");
            assert_eq!(cell.symbol(), ch);
        }
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        for ch in [' ', 'x', 'P', '*', '+'] {
            assert_eq!(Cell::from_symbol(ch), None, "{ch:?}");
        }
    }

    #[test]
    fn wall_never_reports_an_occupant() {
        assert_eq!(Cell::Wall.occupant(), None);
        assert!(!Cell::Wall.is_occupiable());
        assert!(!Cell::Wall.is_vacant());
        assert_eq!(Cell::Wall.with_occupant(Some(Occupant::Crate)), Cell::Wall);
    }

    #[test]
    fn destination_survives_occupant_changes() {
        let dest = Cell::DESTINATION;
        let with_player = dest.with_occupant(Some(Occupant::Player));
        let with_crate = with_player.with_occupant(Some(Occupant::Crate));
        let emptied = with_crate.with_occupant(None);
        assert!(with_player.is_destination() && with_player.has_player());
        assert!(with_crate.is_destination() && with_crate.has_crate());
        assert_eq!(emptied, Cell::DESTINATION);
    }

    #[test]
    fn floor_is_not_a_destination() {
        assert!(!Cell::FLOOR.is_destination());
        assert!(Cell::FLOOR.is_vacant());
        assert!(!Cell::Floor(Some(Occupant::Crate)).is_vacant());
    }
}
