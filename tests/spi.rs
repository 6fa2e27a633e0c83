use std::convert::Infallible;

use embedded_hal_async::spi::{self, ErrorType, SpiBus};

use duplexframe::{
    Error,
    config::{Pod, PodStorage},
    command::{Order, OrderKind},
    frame::DuplexFrame,
    layout::{Master, Slave},
    transport::Memcpy,
    };


/// bus answering with the peer's bytes, and keeping what was sent to it
struct Loopback {
    answer: Vec<u8>,
    sent: Vec<u8>,
}
impl Loopback {
    fn new(answer: &[u8]) -> Self {
        Self {answer: answer.to_vec(), sent: Vec::new()}
    }
}
impl ErrorType for Loopback {
    type Error = Infallible;
}
impl SpiBus for Loopback {
    async fn read(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
        words.copy_from_slice(&self.answer[.. words.len()]);
        Ok(())
    }
    async fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
        self.sent.extend_from_slice(words);
        Ok(())
    }
    async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
        self.write(write).await?;
        self.read(read).await
    }
    async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
        self.sent.extend_from_slice(words);
        words.copy_from_slice(&self.answer[.. words.len()]);
        Ok(())
    }
    async fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Debug)]
struct Unplugged;
impl spi::Error for Unplugged {
    fn kind(&self) -> spi::ErrorKind {spi::ErrorKind::Other}
}
/// bus with no peer
struct Broken;
impl ErrorType for Broken {
    type Error = Unplugged;
}
impl SpiBus for Broken {
    async fn read(&mut self, _words: &mut [u8]) -> Result<(), Unplugged> {Err(Unplugged)}
    async fn write(&mut self, _words: &[u8]) -> Result<(), Unplugged> {Err(Unplugged)}
    async fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Unplugged> {Err(Unplugged)}
    async fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Unplugged> {Err(Unplugged)}
    async fn flush(&mut self) -> Result<(), Unplugged> {Ok(())}
}


#[tokio::test]
async fn cycle_over_spi() {
    let _ = env_logger::builder().is_test(true).try_init();
    let master_pod = Pod::new();
    let slave_pod = Pod::new();
    let mut master_storage = PodStorage::new();
    let mut slave_storage = PodStorage::new();
    let mut master = DuplexFrame::<Master, _>::initialize(&mut master_storage, Memcpy, &master_pod.members()).unwrap();
    let mut slave = DuplexFrame::<Slave, _>::initialize(&mut slave_storage, Memcpy, &slave_pod.members()).unwrap();

    master_pod.communications.issue(Order::Levitate {distance: 8.5});
    slave_pod.airgaps[1].set_airgap(9.25);

    // the slave prepares its frame before the master clocks the exchange
    slave.update_outgoing().unwrap();
    let mut bus = Loopback::new(slave.outgoing());
    master.cycle(&mut bus).await.unwrap();
    assert_eq!(bus.sent.len(), master.frame_len());
    assert_eq!(master_pod.airgaps[1].airgap(), 9.25);

    let mut bus = Loopback::new(&bus.sent);
    slave.cycle(&mut bus).await.unwrap();
    assert_eq!(
        slave_pod.communications.orders().collect::<Vec<_>>(),
        [Order::Levitate {distance: 8.5}],
        );
    assert_eq!(bus.sent, slave.outgoing());
    assert!(!slave_pod.communications.acknowledgments().contains(OrderKind::Levitate));
}

#[tokio::test]
async fn link_failure() {
    let pod = Pod::new();
    let mut storage = PodStorage::new();
    let mut frame = DuplexFrame::<Master, _>::initialize(&mut storage, Memcpy, &pod.members()).unwrap();
    pod.airgaps[0].set_airgap(1.0);
    let before = pod.airgaps[0].airgap();

    assert_eq!(frame.cycle(&mut Broken).await, Err(Error::Link));
    // no incoming update after a failed exchange
    assert_eq!(pod.airgaps[0].airgap(), before);
}
