/*!
    command/status channel and the order handshake running on it

    The master commands an order by writing its parameters and setting its bit in the command packet. The slave, once the order is executed, sets the same bit in its status acknowledgments. The master then clears every commanded bit it sees acknowledged, and the slave drops every acknowledgment whose command was cleared.

    The handshake is level triggered, so both sides run it in a fixed order each cycle:

    - master: `update_incoming`, [Communications::synchronize], [Communications::issue] new orders, `update_outgoing`
    - slave: `update_incoming`, [Communications::release], execute [Communications::orders] and [Communications::acknowledge] them, `update_outgoing`

    An order kind should only be issued again once [Communications::state] is back to [OrderState::Idle]: while the slave still asserts the previous acknowledgment, the next synchronization would clear the new order before the slave ever sees it.

    Issuing an order that is still pending overwrites its parameters, the slave executes whichever parameters it reads last.
*/

use log::*;

use crate::{
    shared::Shared,
    command::{
        CommandPacket, StatusPacket, CommandFlags,
        Order, OrderKind,
        SystemState, ControlState, FramingError,
        },
    layout::{LinkMember, MemberLayout, Layout, Fields, fields_of},
    };


/// progress of an order kind in the handshake, seen from the master
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrderState {
    /// neither commanded nor acknowledged, can be issued
    Idle,
    /// commanded, not acknowledged yet
    Pending,
    /// acknowledged by the slave, and still asserted
    Acknowledged,
}


/// communications member, owning the command packet (downlink) and the status packet (uplink)
#[derive(Debug, Default)]
pub struct Communications {
    command: Shared<CommandPacket>,
    status: Shared<StatusPacket>,
}
impl Communications {
    pub fn new() -> Self {Self::default()}

    /// command packet as currently in memory, without framing check
    pub fn command_packet(&self) -> CommandPacket {self.command.get()}
    /// status packet as currently in memory, without framing check
    pub fn status_packet(&self) -> StatusPacket {self.status.get()}

    /// orders currently commanded
    pub fn commands(&self) -> CommandFlags {self.command.get().commands}
    /// orders currently acknowledged
    pub fn acknowledgments(&self) -> CommandFlags {self.status.get().acknowledgments}

    /**
        progress of an order kind

        on the master this is only up to date after its incoming update
    */
    pub fn state(&self, kind: OrderKind) -> OrderState {
        if self.acknowledgments().contains(kind)
            {OrderState::Acknowledged}
        else if self.commands().contains(kind)
            {OrderState::Pending}
        else
            {OrderState::Idle}
    }
}

/// master side of the handshake
impl Communications {
    /// command an order, it will be sent at next outgoing update
    pub fn issue(&self, order: Order) {
        self.command.update(|packet| {
            if packet.commands.contains(order.kind()) {
                warn!("{:?} issued again before acknowledgment, overwriting parameters", order.kind());
            }
            packet.write(order);
        });
        debug!("issued {:?}", order);
    }
    /**
        clear the commanded orders the slave acknowledged

        uses the acknowledgments received at the last incoming update, calling it again without a new update changes nothing. A badly framed status is ignored.
    */
    pub fn synchronize(&self) {
        let Ok(status) = self.status()
            else {return};
        let acknowledgments = status.acknowledgments;
        self.command.update(|packet| {
            let done = packet.commands.intersection(acknowledgments);
            if !done.is_empty() {
                trace!("acknowledged {:?}", done);
            }
            packet.commands = packet.commands.difference(acknowledgments);
        });
    }
    /// status received from the slave, if correctly framed
    pub fn status(&self) -> Result<StatusPacket, FramingError> {
        let status = self.status.get();
        status.check_framing() .inspect_err(|err| warn!("status packet: {}", err))?;
        Ok(status)
    }
}

/// slave side of the handshake
impl Communications {
    /// command received from the master, if correctly framed
    pub fn command(&self) -> Result<CommandPacket, FramingError> {
        let command = self.command.get();
        command.check_framing() .inspect_err(|err| warn!("command packet: {}", err))?;
        Ok(command)
    }
    /**
        orders commanded but not acknowledged yet, with their parameters

        nothing if the command packet is badly framed
    */
    pub fn orders(&self) -> impl Iterator<Item=Order> {
        let (packet, pending) = match self.command() {
            Ok(packet) => (packet, packet.commands.difference(self.acknowledgments())),
            Err(_) => (CommandPacket::default(), CommandFlags::none()),
        };
        pending.iter().map(move |kind| packet.order(kind))
    }
    /// mark an order as executed, the master will see it at next exchange
    pub fn acknowledge(&self, kind: OrderKind) {
        self.status.update(|packet| packet.acknowledgments.insert(kind));
        debug!("acknowledged {:?}", kind);
    }
    /**
        drop the acknowledgments of orders the master no longer commands

        must be called after the incoming update, before acknowledging new orders. A badly framed command is ignored.
    */
    pub fn release(&self) {
        let Ok(command) = self.command()
            else {return};
        let commands = command.commands;
        self.status.update(|packet| {
            let released = packet.acknowledgments.difference(commands);
            if !released.is_empty() {
                trace!("released {:?}", released);
            }
            packet.acknowledgments = packet.acknowledgments.intersection(commands);
        });
    }
    /// publish the slave state
    pub fn report(&self, system: SystemState, control: ControlState, error_code: u16) {
        self.status.update(|packet| {
            packet.system_state = system;
            packet.control_state = control;
            packet.error_code = error_code;
        });
    }
}

// SAFETY: all fields are `Shared` cells of the member
unsafe impl LinkMember for Communications {
    fn downlink_fields(&self) -> Fields {
        fields_of([self.command.field()])
    }
    fn uplink_fields(&self) -> Fields {
        fields_of([self.status.field()])
    }
}
impl MemberLayout for Communications {
    const DOWNLINK: Layout = Layout::of::<CommandPacket>();
    const UPLINK: Layout = Layout::of::<StatusPacket>();
}
