/*!
    full-duplex exchange of frames over SPI

    both boards shift their outgoing buffer while receiving the peer's, so each transfer moves [DuplexFrame::frame_len] bytes each way.
*/

use embedded_hal_async::spi::SpiBus;
use log::*;

use crate::{
    Error,
    frame::DuplexFrame,
    layout::Role,
    transport::Transport,
    };


impl<R: Role, T: Transport> DuplexFrame<'_, R, T> {
    /**
        run one link cycle: outgoing update, SPI exchange, incoming update

        on the master, `bus` should drive chip select around the transfer, on the slave it waits for the master's clock
    */
    pub async fn cycle<S: SpiBus>(&mut self, bus: &mut S) -> Result<(), Error> {
        self.update_outgoing()?;
        {
            let (outgoing, incoming) = self.buffers_mut();
            trace!("exchanging {} bytes", outgoing.len());
            bus.transfer(incoming, outgoing).await .map_err(|err| {
                error!("spi exchange failed: {:?}", err);
                Error::Link
                })?;
        }
        self.update_incoming()
    }
}
