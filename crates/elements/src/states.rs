use bitflags::bitflags;

bitflags! {
    /// The common interaction states, as a set.
    ///
    /// Each flag stands for the state name returned by [`PseudoStates::names`];
    /// elements store states by name so that conditions can refer to any
    /// state, these included.
    ///
    /// # Example
    ///
    /// ```
    /// use elements::PseudoStates;
    ///
    /// let mut states = PseudoStates::empty();
    /// states |= PseudoStates::FOCUS;
    /// states |= PseudoStates::HOVER;
    ///
    /// assert_eq!(states.names().collect::<Vec<_>>(), ["focus", "hover"]);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PseudoStates: u8 {
        /// Element has keyboard focus
        const FOCUS    = 0b0000_0001;
        /// Pointer is over the element
        const HOVER    = 0b0000_0010;
        /// Element is being pressed
        const ACTIVE   = 0b0000_0100;
        /// Element does not accept input
        const DISABLED = 0b0000_1000;
    }
}

const NAMES: [(PseudoStates, &str); 4] = [
    (PseudoStates::FOCUS, "focus"),
    (PseudoStates::HOVER, "hover"),
    (PseudoStates::ACTIVE, "active"),
    (PseudoStates::DISABLED, "disabled"),
];

impl PseudoStates {
    /// State names of the flags that are set.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }

    /// Every name a flag can stand for.
    pub fn all_names() -> impl Iterator<Item = &'static str> {
        NAMES.into_iter().map(|(_, name)| name)
    }

    pub fn from_state_name(name: &str) -> Option<PseudoStates> {
        NAMES
            .into_iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| flag)
    }
}
