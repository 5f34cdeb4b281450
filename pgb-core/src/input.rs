use pgb_proc_macros::{EnumDisplay, EnumFromStr, StrDeserialize, StrSerialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDisplay, EnumFromStr, StrSerialize, StrDeserialize,
)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    Start,
    Select,
}

impl Button {
    pub const ALL: [Self; 8] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::A,
        Self::B,
        Self::Start,
        Self::Select,
    ];

    fn is_action(self) -> bool {
        matches!(self, Self::A | Self::B | Self::Start | Self::Select)
    }

    /// The JOYP bit this button drives when its half of the pad is selected.
    fn joyp_bit(self) -> u8 {
        match self {
            Self::Right | Self::A => 0x01,
            Self::Left | Self::B => 0x02,
            Self::Up | Self::Select => 0x04,
            Self::Down | Self::Start => 0x08,
        }
    }
}

/// Live pressed/released state of the eight buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoypadState {
    pressed: [bool; 8],
}

impl JoypadState {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(button: Button) -> usize {
        button as usize
    }

    /// Mark a button pressed. Returns true if the button was not already held.
    pub fn press(&mut self, button: Button) -> bool {
        let was_pressed = self.pressed[Self::index(button)];
        self.pressed[Self::index(button)] = true;
        !was_pressed
    }

    pub fn release(&mut self, button: Button) {
        self.pressed[Self::index(button)] = false;
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed[Self::index(button)]
    }

    /// Whether the given button is visible through the given JOYP selection bits.
    pub fn is_selected(button: Button, joyp_select: u8) -> bool {
        let actions_select = joyp_select & 0x20 == 0;
        let directions_select = joyp_select & 0x10 == 0;
        if button.is_action() {
            actions_select
        } else {
            directions_select
        }
    }

    /// Compute the value the program sees when reading JOYP. Buttons are active-low: a pressed
    /// button reads as 0 in whichever half is selected by bits 4-5.
    pub fn joyp_value(&self, joyp_select: u8) -> u8 {
        let low_nibble = Button::ALL
            .into_iter()
            .filter(|&button| self.is_pressed(button) && Self::is_selected(button, joyp_select))
            .fold(0x0F, |nibble, button| nibble & !button.joyp_bit());

        0xC0 | (joyp_select & 0x30) | low_nibble
    }
}
