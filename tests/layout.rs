use packbytes::ToBytes;

use duplexframe::{
    Error,
    config::{self, Pod},
    command::{CommandPacket, StatusPacket, Order, START_SENTINEL, END_SENTINEL},
    layout::{self, LinkMember, Side, Stream, Direction, Layout, FrameLayout, Field, MEMBER_FIELDS},
    members::{Airgap, Lpu, Communications},
    };


#[test]
fn direction_mapping() {
    assert_eq!(Side::Master.stream(Direction::Outgoing), Stream::Downlink);
    assert_eq!(Side::Master.stream(Direction::Incoming), Stream::Uplink);
    assert_eq!(Side::Slave.stream(Direction::Outgoing), Stream::Uplink);
    assert_eq!(Side::Slave.stream(Direction::Incoming), Stream::Downlink);
}

#[test]
fn packet_sizes() {
    assert_eq!(Layout::of::<CommandPacket>(), Layout {fields: 1, bytes: 24});
    assert_eq!(Layout::of::<StatusPacket>(), Layout {fields: 1, bytes: 10});
}

#[test]
fn command_packet_wire_shape() {
    let mut packet = CommandPacket::default();
    packet.write(Order::CurrentControl {current: 2.5, lpu: 3});
    let bytes = packet.to_le_bytes();

    assert_eq!(bytes[0 .. 2], START_SENTINEL.to_le_bytes());
    assert_eq!(bytes[2 .. 4], (1u16 << 4).to_le_bytes(), "current control is bit 4");
    assert_eq!(bytes[4 .. 8], 0f32.to_le_bytes(), "desired distance");
    assert_eq!(bytes[8 .. 12], 2.5f32.to_le_bytes(), "desired current");
    assert_eq!(bytes[12], 3, "current control lpu");
    assert_eq!(bytes[22 .. 24], END_SENTINEL.to_le_bytes());
}

#[test]
fn status_packet_wire_shape() {
    let mut packet = StatusPacket::default();
    packet.error_code = 0x1234;
    let bytes = packet.to_le_bytes();

    assert_eq!(bytes[0 .. 2], START_SENTINEL.to_le_bytes());
    assert_eq!(bytes[2 .. 4], [0, 0]);
    assert_eq!(bytes[6 .. 8], 0x1234u16.to_le_bytes());
    assert_eq!(bytes[8 .. 10], END_SENTINEL.to_le_bytes());
}

#[test]
fn deduction_follows_declaration_order() {
    let communications = Communications::new();
    let lpus = [Lpu::new(), Lpu::new()];
    let airgap = Airgap::new();
    let members: [&dyn LinkMember; 4] = [&communications, &lpus[0], &airgap, &lpus[1]];

    let expected = communications.downlink_fields().into_iter()
        .chain(lpus[0].downlink_fields())
        .chain(lpus[1].downlink_fields())
        .collect::<Vec<Field>>();
    let outgoing = layout::deduce(Side::Master, &members, Direction::Outgoing).collect::<Vec<_>>();
    assert_eq!(outgoing, expected);
    let incoming = layout::deduce(Side::Slave, &members, Direction::Incoming).collect::<Vec<_>>();
    assert_eq!(incoming, expected);

    let expected = communications.uplink_fields().into_iter()
        .chain(lpus[0].uplink_fields())
        .chain(airgap.uplink_fields())
        .chain(lpus[1].uplink_fields())
        .collect::<Vec<Field>>();
    let incoming = layout::deduce(Side::Master, &members, Direction::Incoming).collect::<Vec<_>>();
    assert_eq!(incoming, expected);
    let outgoing = layout::deduce(Side::Slave, &members, Direction::Outgoing).collect::<Vec<_>>();
    assert_eq!(outgoing, expected);
}

#[test]
fn offsets_agree_between_roles() {
    // each board has its own members, only sizes and offsets can match
    let master = Pod::new();
    let slave = Pod::new();
    let master_members = master.members();
    let master_members = master_members.as_slice();
    let slave_members = slave.members();
    let slave_members = slave_members.as_slice();

    let shape = |side: Side, members: &[&dyn LinkMember], direction: Direction| {
        layout::offsets(side, members, direction)
            .map(|(field, offset)| (field.size(), offset))
            .collect::<Vec<_>>()
    };
    let downlink = shape(Side::Master, master_members, Direction::Outgoing);
    assert_eq!(downlink, shape(Side::Slave, slave_members, Direction::Incoming));
    let uplink = shape(Side::Slave, slave_members, Direction::Outgoing);
    assert_eq!(uplink, shape(Side::Master, master_members, Direction::Incoming));

    // offsets are the running sum of sizes
    let mut expected = 0;
    for (size, offset) in uplink {
        assert_eq!(offset, expected);
        expected += size;
    }
    assert_eq!(expected, config::UPLINK.bytes);
}

#[test]
fn measured_layout_matches_constants() {
    let pod = Pod::new();
    let members = pod.members();
    assert_eq!(members.len(), config::MEMBERS);

    let master = FrameLayout::measure(Side::Master, &members);
    assert_eq!(master.outgoing, config::DOWNLINK);
    assert_eq!(master.incoming, config::UPLINK);
    let slave = FrameLayout::measure(Side::Slave, &members);
    assert_eq!(slave.outgoing, config::UPLINK);
    assert_eq!(slave.incoming, config::DOWNLINK);

    assert_eq!(master.frame_len(), config::FRAME_BYTES);
    assert_eq!(slave.frame_len(), config::FRAME_BYTES);
    // command packet and one flag byte per lpu
    assert_eq!(config::DOWNLINK, Layout {fields: 1 + config::LPUS, bytes: 24 + config::LPUS});
    // status packet, 9 bytes per lpu, 4 bytes per airgap
    assert_eq!(config::UPLINK, Layout {
        fields: 1 + 3 * config::LPUS + config::AIRGAPS,
        bytes: 10 + 9 * config::LPUS + 4 * config::AIRGAPS,
        });
}

#[test]
fn no_member() {
    let layout = FrameLayout::measure(Side::Master, &[]);
    assert_eq!(layout, FrameLayout::default());
    assert_eq!(layout.frame_len(), 0);
}

#[test]
fn member_fields_overflow() {
    let airgap = Airgap::new();
    let field = airgap.uplink_fields()[0];

    let full = layout::fields(core::iter::repeat_n(field, MEMBER_FIELDS)).unwrap();
    assert_eq!(full.len(), MEMBER_FIELDS);
    assert_eq!(
        layout::fields(core::iter::repeat_n(field, MEMBER_FIELDS + 1)),
        Err(Error::MemberFields),
        );
}
