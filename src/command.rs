/*!
    command and status packets exchanged by the communications member

    the master writes orders in a [CommandPacket], the slave acknowledges them in a [StatusPacket]. Both are framed by sentinel values a transport can check to detect a shifted frame.
*/

use bilge::prelude::*;
use packbytes::{FromBytes, ToBytes};
use thiserror::Error;

use crate::pack_bits;


/// first field of every packet
pub const START_SENTINEL: u16 = 0xA55A;
/// last field of every packet
pub const END_SENTINEL: u16 = 0x5AA5;


/// identifier of an order, its discriminant is its bit in [CommandFlags]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OrderKind {
    Enable = 0,
    Disable = 1,
    Levitate = 2,
    StopLevitate = 3,
    CurrentControl = 4,
    StartPwm = 5,
    StopPwm = 6,
    StickDown = 7,
    ReleaseStick = 8,
}
impl OrderKind {
    pub const ALL: [Self; 9] = [
        Self::Enable,
        Self::Disable,
        Self::Levitate,
        Self::StopLevitate,
        Self::CurrentControl,
        Self::StartPwm,
        Self::StopPwm,
        Self::StickDown,
        Self::ReleaseStick,
        ];
    /// bit of this order in command and acknowledgment masks
    pub const fn mask(self) -> u16 {
        1 << self as u16
    }
}

/// order with its parameters, as issued by the master
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Order {
    Enable,
    Disable,
    /// levitate at the given distance (mm)
    Levitate {distance: f32},
    StopLevitate,
    /// regulate the current (A) of one LPU
    CurrentControl {current: f32, lpu: u8},
    /// drive one LPU with a fixed PWM, frequency in Hz and duty in [0, 1]
    StartPwm {frequency: f32, duty: f32, lpu: u8},
    StopPwm,
    StickDown,
    ReleaseStick,
}
impl Order {
    pub const fn kind(&self) -> OrderKind {
        match self {
            Self::Enable => OrderKind::Enable,
            Self::Disable => OrderKind::Disable,
            Self::Levitate {..} => OrderKind::Levitate,
            Self::StopLevitate => OrderKind::StopLevitate,
            Self::CurrentControl {..} => OrderKind::CurrentControl,
            Self::StartPwm {..} => OrderKind::StartPwm,
            Self::StopPwm => OrderKind::StopPwm,
            Self::StickDown => OrderKind::StickDown,
            Self::ReleaseStick => OrderKind::ReleaseStick,
        }
    }
}


/**
    bitmask of orders

    used by the master for the orders it commands, and by the slave for the orders it acknowledges
*/
#[bitsize(16)]
#[derive(Copy, Clone, FromBits, DebugBits, PartialEq, DefaultBits)]
pub struct CommandFlags {
    pub enable: bool,
    pub disable: bool,
    pub levitate: bool,
    pub stop_levitate: bool,
    pub current_control: bool,
    pub start_pwm: bool,
    pub stop_pwm: bool,
    pub stick_down: bool,
    pub release_stick: bool,
    reserved: u7,
}
pack_bits!(CommandFlags, u16);

impl CommandFlags {
    pub fn none() -> Self {
        Self::from_bits(0)
    }
    pub fn from_bits(bits: u16) -> Self {
        Self::from(bits)
    }
    pub fn bits(self) -> u16 {
        u16::from(self)
    }
    pub fn is_empty(self) -> bool {
        self.bits() == 0
    }
    pub fn contains(self, kind: OrderKind) -> bool {
        self.bits() & kind.mask() != 0
    }
    pub fn insert(&mut self, kind: OrderKind) {
        *self = Self::from_bits(self.bits() | kind.mask());
    }
    pub fn remove(&mut self, kind: OrderKind) {
        *self = Self::from_bits(self.bits() & !kind.mask());
    }
    pub fn union(self, other: Self) -> Self {
        Self::from_bits(self.bits() | other.bits())
    }
    pub fn intersection(self, other: Self) -> Self {
        Self::from_bits(self.bits() & other.bits())
    }
    /// orders in `self` but not in `other`
    pub fn difference(self, other: Self) -> Self {
        Self::from_bits(self.bits() & !other.bits())
    }
    /// orders set, in bit order
    pub fn iter(self) -> impl Iterator<Item=OrderKind> {
        OrderKind::ALL.into_iter().filter(move |&kind| self.contains(kind))
    }
}
impl From<OrderKind> for CommandFlags {
    fn from(kind: OrderKind) -> Self {
        Self::from_bits(kind.mask())
    }
}


/// general state of the slave board
#[bitsize(8)]
#[derive(Copy, Clone, Default, FromBits, Debug, PartialEq)]
pub enum SystemState {
    #[default]
    Connecting = 0,
    Operational = 1,
    Fault = 2,
    #[fallback]
    Unknown = 255,
}
pack_bits!(SystemState, u8);

/// state of the slave's control loop
#[bitsize(8)]
#[derive(Copy, Clone, Default, FromBits, Debug, PartialEq)]
pub enum ControlState {
    #[default]
    Idle = 0,
    Levitating = 1,
    CurrentControl = 2,
    Pwm = 3,
    StickDown = 4,
    #[fallback]
    Unknown = 255,
}
pack_bits!(ControlState, u8);


/// sentinel mismatch in a received packet, the frame is probably shifted or corrupted
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum FramingError {
    #[error("start sentinel is {0:#06x}")]
    Start(u16),
    #[error("end sentinel is {0:#06x}")]
    End(u16),
}

fn check_sentinels(start: u16, end: u16) -> Result<(), FramingError> {
    if start != START_SENTINEL
        {return Err(FramingError::Start(start))}
    if end != END_SENTINEL
        {return Err(FramingError::End(end))}
    Ok(())
}


/**
    master to slave packet

    there is a single parameter slot per order kind: issuing an order again before it is acknowledged replaces its parameters
*/
#[derive(Copy, Clone, Debug, PartialEq, FromBytes, ToBytes)]
pub struct CommandPacket {
    pub start: u16,
    /// orders commanded and not yet seen acknowledged
    pub commands: CommandFlags,
    /// levitation distance (mm)
    pub desired_distance: f32,
    /// current control setpoint (A)
    pub desired_current: f32,
    pub current_control_lpu_id: u8,
    /// PWM frequency (Hz)
    pub pwm_frequency: f32,
    pub pwm_duty: f32,
    pub pwm_lpu_id: u8,
    pub end: u16,
}
impl Default for CommandPacket {
    fn default() -> Self {
        Self {
            start: START_SENTINEL,
            commands: CommandFlags::none(),
            desired_distance: 0.,
            desired_current: 0.,
            current_control_lpu_id: 0,
            pwm_frequency: 0.,
            pwm_duty: 0.,
            pwm_lpu_id: 0,
            end: END_SENTINEL,
        }
    }
}
impl CommandPacket {
    pub fn check_framing(&self) -> Result<(), FramingError> {
        check_sentinels(self.start, self.end)
    }
    /// write the order's parameters, then set its bit
    pub fn write(&mut self, order: Order) {
        match order {
            Order::Levitate {distance} => {
                self.desired_distance = distance;
            },
            Order::CurrentControl {current, lpu} => {
                self.desired_current = current;
                self.current_control_lpu_id = lpu;
            },
            Order::StartPwm {frequency, duty, lpu} => {
                self.pwm_frequency = frequency;
                self.pwm_duty = duty;
                self.pwm_lpu_id = lpu;
            },
            Order::Enable
            | Order::Disable
            | Order::StopLevitate
            | Order::StopPwm
            | Order::StickDown
            | Order::ReleaseStick => {},
        }
        self.commands.insert(order.kind());
    }
    /// order of the given kind with its current parameters, whether commanded or not
    pub fn order(&self, kind: OrderKind) -> Order {
        match kind {
            OrderKind::Enable => Order::Enable,
            OrderKind::Disable => Order::Disable,
            OrderKind::Levitate => Order::Levitate {distance: self.desired_distance},
            OrderKind::StopLevitate => Order::StopLevitate,
            OrderKind::CurrentControl => Order::CurrentControl {
                current: self.desired_current,
                lpu: self.current_control_lpu_id,
                },
            OrderKind::StartPwm => Order::StartPwm {
                frequency: self.pwm_frequency,
                duty: self.pwm_duty,
                lpu: self.pwm_lpu_id,
                },
            OrderKind::StopPwm => Order::StopPwm,
            OrderKind::StickDown => Order::StickDown,
            OrderKind::ReleaseStick => Order::ReleaseStick,
        }
    }
}

/// slave to master packet
#[derive(Copy, Clone, Debug, PartialEq, FromBytes, ToBytes)]
pub struct StatusPacket {
    pub start: u16,
    /// orders the slave considers satisfied
    pub acknowledgments: CommandFlags,
    pub system_state: SystemState,
    pub control_state: ControlState,
    /// detail of the last fault, 0 if none
    pub error_code: u16,
    pub end: u16,
}
impl Default for StatusPacket {
    fn default() -> Self {
        Self {
            start: START_SENTINEL,
            acknowledgments: CommandFlags::none(),
            system_state: SystemState::default(),
            control_state: ControlState::default(),
            error_code: 0,
            end: END_SENTINEL,
        }
    }
}
impl StatusPacket {
    pub fn check_framing(&self) -> Result<(), FramingError> {
        check_sentinels(self.start, self.end)
    }
}
