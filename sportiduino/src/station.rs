//! High-level master station interface

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Datelike, Timelike, Utc};
use tracing::{debug, info, trace, warn};

use sportiduino_core::{
    constants::{MAX_FRAGMENTS, START_BYTE},
    params, Command, Frame, PortAttempt, Reassembler, Response,
};
use sportiduino_transport::{PortOpener, SerialOpener, Transport};
use sportiduino_types::{CardData, LogEntry, RawCardData, ReadMode, VersionInfo};

use crate::config::StationConfig;
use crate::discovery::{PortDiscovery, SystemPorts};
use crate::error::{Error, Result};
use crate::observer::{FrameObserver, TracingObserver};
use crate::ProtocolError;

/// Connection state of a [`MasterStation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Builds a connected [`MasterStation`]
///
/// Holds the collaborators used to find and open the station. Building a
/// connector performs no I/O; only [`Connector::connect`] does.
pub struct Connector {
    config: StationConfig,
    opener: Arc<dyn PortOpener>,
    discovery: Box<dyn PortDiscovery>,
    observer: Arc<dyn FrameObserver>,
}

impl Connector {
    /// Connector using serial ports of the running system
    pub fn new(config: StationConfig) -> Self {
        let opener = SerialOpener::new(config.baud_rate);
        Self {
            config,
            opener: Arc::new(opener),
            discovery: Box::new(SystemPorts),
            observer: Arc::new(TracingObserver),
        }
    }
    
    /// Open ports through a different opener
    pub fn with_opener(mut self, opener: Arc<dyn PortOpener>) -> Self {
        self.opener = opener;
        self
    }
    
    /// Find candidate ports through a different discovery
    pub fn with_discovery(mut self, discovery: impl PortDiscovery + 'static) -> Self {
        self.discovery = Box::new(discovery);
        self
    }
    
    /// Report frames to a different observer
    pub fn with_observer(mut self, observer: Arc<dyn FrameObserver>) -> Self {
        self.observer = observer;
        self
    }
    
    /// Open the configured port, or scan candidate ports when none is set
    ///
    /// A port is accepted once it opens and answers a version query.
    ///
    /// # Errors
    ///
    /// With an explicit port, the error of opening or querying it. When
    /// scanning, [`ProtocolError::NoDeviceFound`] listing every port tried
    /// and why it was rejected.
    pub async fn connect(self) -> Result<MasterStation> {
        let Self {
            config,
            opener,
            discovery,
            observer,
        } = self;
        
        let mut station = MasterStation {
            transport: None,
            port: String::new(),
            config,
            opener,
            observer,
            version: None,
        };
        
        if let Some(port) = station.config.port.clone() {
            station.open_port(&port).await?;
            return Ok(station);
        }
        
        let candidates = discovery.candidate_addresses();
        debug!("Scanning {} candidate ports", candidates.len());
        
        let mut attempts = Vec::with_capacity(candidates.len());
        for address in candidates {
            match station.open_port(&address).await {
                Ok(()) => return Ok(station),
                Err(e) => {
                    warn!("No master station on {}: {}", address, e);
                    attempts.push(PortAttempt::new(address, e.to_string()));
                }
            }
        }
        
        Err(ProtocolError::NoDeviceFound { attempts }.into())
    }
}

/// Sportiduino master station
///
/// Owns the transport to one station. Every method sends one command and
/// waits for its complete response before returning.
///
/// # Examples
///
/// ```no_run
/// use sportiduino::{MasterStation, StationConfig};
///
/// #[tokio::main]
/// async fn main() -> sportiduino::Result<()> {
///     let mut station = MasterStation::connect(StationConfig::new()).await?;
///     println!("Connected to {} (firmware {:?})", station.port(), station.version());
///
///     if let Some(card) = station.poll_card().await? {
///         println!("{}", card);
///         station.beep_ok().await?;
///     }
///
///     station.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct MasterStation {
    transport: Option<Box<dyn Transport>>,
    port: String,
    config: StationConfig,
    opener: Arc<dyn PortOpener>,
    observer: Arc<dyn FrameObserver>,
    version: Option<VersionInfo>,
}

impl MasterStation {
    /// Connect over serial, scanning ports when the config names none
    pub async fn connect(config: StationConfig) -> Result<Self> {
        Connector::new(config).connect().await
    }
    
    /// Connect with injected port opener and discovery
    pub async fn connect_with(
        config: StationConfig,
        opener: Arc<dyn PortOpener>,
        discovery: impl PortDiscovery + 'static,
    ) -> Result<Self> {
        Connector::new(config)
            .with_opener(opener)
            .with_discovery(discovery)
            .connect()
            .await
    }
    
    /// Port the station is (or was last) connected on
    pub fn port(&self) -> &str {
        &self.port
    }
    
    /// Firmware version reported when the connection was opened
    pub fn version(&self) -> Option<VersionInfo> {
        self.version
    }
    
    pub fn config(&self) -> &StationConfig {
        &self.config
    }
    
    pub fn state(&self) -> ConnectionState {
        match &self.transport {
            Some(_) => ConnectionState::Connected,
            None => ConnectionState::Disconnected,
        }
    }
    
    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
    
    /// Close the transport
    ///
    /// Does nothing when already disconnected.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut transport) = self.transport.take() {
            info!("Disconnecting from {}...", self.port);
            transport.close().await?;
            info!("Disconnected");
        }
        Ok(())
    }
    
    /// Close and reopen the same port
    pub async fn reconnect(&mut self) -> Result<()> {
        self.disconnect().await?;
        let port = self.port.clone();
        self.open_port(&port).await
    }
    
    /// Send a command and wait for the complete raw response
    ///
    /// With `blocking`, read timeouts are retried until a response arrives;
    /// every other error is returned immediately. Fragments received before
    /// a timeout are kept and the retry continues with the next one.
    pub async fn send_command(
        &mut self,
        command: Command,
        parameters: &[u8],
        blocking: bool,
    ) -> Result<(u8, Bytes)> {
        let frame = Frame::request(command, parameters)?;
        let encoded = frame.encode();
        
        debug!("Sending {} ({} parameter bytes)", command, parameters.len());
        self.observer.on_send(command, &encoded);
        
        self.transport_mut()?.write(&encoded).await?;
        
        let mut reassembler = Reassembler::with_max_fragments(MAX_FRAGMENTS);
        loop {
            match self.read_logical_response(&mut reassembler).await {
                Err(e) if blocking && e.is_timeout() => {
                    trace!(
                        "No response to {} yet, waiting (fragment in progress: {})",
                        command,
                        reassembler.in_progress()
                    );
                }
                result => return result,
            }
        }
    }
    
    /// Send a command and decode its response
    pub async fn request(&mut self, command: Command, parameters: &[u8]) -> Result<Response> {
        self.request_with(command, parameters, false).await
    }
    
    /// Query firmware version
    pub async fn read_version(&mut self) -> Result<VersionInfo> {
        match self.request(Command::ReadVersion, &[]).await? {
            Response::Version(version) => Ok(version),
            other => Err(unexpected(Command::ReadVersion, &other)),
        }
    }
    
    /// Confirmation beep
    pub async fn beep_ok(&mut self) -> Result<()> {
        self.expect_ok(Command::BeepOk, &[]).await
    }
    
    /// Error beep
    pub async fn beep_error(&mut self) -> Result<()> {
        self.expect_ok(Command::BeepError, &[]).await
    }
    
    /// Set the station clock
    pub async fn set_time<T: Datelike + Timelike>(&mut self, time: &T) -> Result<()> {
        let params = params::set_time(time)?;
        self.expect_ok(Command::SetTime, &params).await
    }
    
    /// Set the checkpoint number
    pub async fn set_cp_number(&mut self, checkpoint: u8) -> Result<()> {
        self.expect_ok(Command::SetCpNumber, &params::set_cp_number(checkpoint)).await
    }
    
    /// Change the station password and settings
    pub async fn set_password(&mut self, old: u32, new: u32, settings: u8) -> Result<()> {
        let params = params::set_password(old, new, settings)?;
        self.expect_ok(Command::SetPassword, &params).await
    }
    
    /// Initialize the card on the station with the current time
    pub async fn init_card(&mut self, card_number: u16, page6: &[u8], page7: &[u8]) -> Result<()> {
        let now = Utc::now().timestamp();
        let timestamp = u32::try_from(now).map_err(|_| ProtocolError::Overflow {
            value: now.unsigned_abs(),
            width: 4,
        })?;
        self.init_card_at(card_number, timestamp, page6, page7).await
    }
    
    /// Initialize the card on the station with an explicit init time
    pub async fn init_card_at(
        &mut self,
        card_number: u16,
        timestamp: u32,
        page6: &[u8],
        page7: &[u8],
    ) -> Result<()> {
        let params = params::init_card(card_number, timestamp, page6, page7)?;
        self.expect_ok(Command::InitCard, &params).await
    }
    
    /// Overwrite pages 6 and 7 of the card on the station
    pub async fn write_pages6_7(&mut self, page6: &[u8], page7: &[u8]) -> Result<()> {
        let params = params::write_pages6_7(page6, page7)?;
        self.expect_ok(Command::WritePages, &params).await
    }
    
    /// Turn the card on the station into a sleep card
    pub async fn init_sleep_card(&mut self) -> Result<()> {
        self.expect_ok(Command::InitSleepCard, &[]).await
    }
    
    /// Turn the card on the station into a log reader card
    pub async fn init_log_reader(&mut self) -> Result<()> {
        self.expect_ok(Command::InitLogReader, &[]).await
    }
    
    /// Read the checkpoint log collected by a log reader card
    pub async fn read_log(&mut self) -> Result<LogEntry> {
        match self.request(Command::ReadLogReader, &[]).await? {
            Response::Log(entry) => Ok(entry),
            other => Err(unexpected(Command::ReadLogReader, &other)),
        }
    }
    
    /// Read the card on the station
    pub async fn read_card(&mut self) -> Result<CardData> {
        self.read_card_with(false).await
    }
    
    /// Read the card on the station, `None` when no card is present
    pub async fn poll_card(&mut self) -> Result<Option<CardData>> {
        match self.read_card().await {
            Ok(card) => Ok(Some(card)),
            Err(Error::Device(sportiduino_core::DeviceError::CardRead)) => Ok(None),
            Err(e) if e.is_timeout() => Ok(None),
            Err(e) => Err(e),
        }
    }
    
    /// Wait until the station reports a card
    pub async fn wait_for_card(&mut self) -> Result<CardData> {
        self.read_card_with(true).await
    }
    
    /// Dump the raw pages of the card on the station
    pub async fn read_card_raw(&mut self) -> Result<RawCardData> {
        match self.request(Command::ReadRaw, &[]).await? {
            Response::CardRaw(raw) => Ok(raw),
            other => Err(unexpected(Command::ReadRaw, &other)),
        }
    }
    
    /// Switch between single and continuous card reading
    pub async fn set_read_mode(&mut self, mode: ReadMode) -> Result<()> {
        match self.request(Command::SetReadMode, &params::set_read_mode(mode)).await? {
            Response::Ok => Ok(()),
            Response::Mode(actual) if actual == mode => Ok(()),
            other => Err(unexpected(Command::SetReadMode, &other)),
        }
    }
    
    // Helper methods
    
    async fn open_port(&mut self, address: &str) -> Result<()> {
        info!("Connecting to {}...", address);
        
        let transport = self.opener.open(address).await?;
        self.transport = Some(transport);
        self.port = address.to_string();
        self.version = None;
        
        match self.check_alive().await {
            Ok(version) => {
                info!("Connected to {} (firmware {})", address, version);
                self.version = Some(version);
                Ok(())
            }
            Err(e) => {
                if let Err(close_err) = self.disconnect().await {
                    warn!("Failed to close {}: {}", address, close_err);
                }
                Err(e)
            }
        }
    }
    
    /// Drop stale input and ask for the firmware version
    async fn check_alive(&mut self) -> Result<VersionInfo> {
        self.transport_mut()?.flush_input().await?;
        self.read_version().await
    }
    
    async fn read_card_with(&mut self, blocking: bool) -> Result<CardData> {
        match self.request_with(Command::ReadCard, &[], blocking).await? {
            Response::CardData(card) => Ok(card),
            other => Err(unexpected(Command::ReadCard, &other)),
        }
    }
    
    async fn request_with(
        &mut self,
        command: Command,
        parameters: &[u8],
        blocking: bool,
    ) -> Result<Response> {
        let (code, data) = self.send_command(command, parameters, blocking).await?;
        let response = Response::parse(code, data)?;
        
        debug!("{} -> {}", command, response);
        
        Ok(response)
    }
    
    async fn expect_ok(&mut self, command: Command, parameters: &[u8]) -> Result<()> {
        match self.request(command, parameters).await? {
            Response::Ok => Ok(()),
            other => Err(unexpected(command, &other)),
        }
    }
    
    /// Read frames until one logical response is complete
    async fn read_logical_response(&mut self, reassembler: &mut Reassembler) -> Result<(u8, Bytes)> {
        loop {
            let frame = self.read_frame().await?;
            if let Some(response) = reassembler.push(frame)? {
                return Ok(response);
            }
        }
    }
    
    /// Read and verify one frame
    async fn read_frame(&mut self) -> Result<Frame> {
        let timeout = self.config.timeout;
        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        
        let start = transport.read_exact(1, timeout).await?;
        if start[0] != START_BYTE {
            transport.flush_input().await?;
            return Err(ProtocolError::Framing(start[0]).into());
        }
        
        let header = transport.read_exact(2, timeout).await?;
        let (code, length) = (header[0], header[1]);
        
        let payload_len = Frame::payload_len(length);
        let mut payload = transport.read_exact(payload_len + 1, timeout).await?;
        let checksum = payload.split_off(payload_len)[0];
        
        let frame = Frame::from_parts(code, length, payload.freeze(), checksum)?;
        self.observer.on_receive(&frame);
        
        Ok(frame)
    }
    
    fn transport_mut(&mut self) -> Result<&mut Box<dyn Transport>> {
        self.transport.as_mut().ok_or(Error::NotConnected)
    }
}

impl Drop for MasterStation {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Master station on {} dropped while still connected", self.port);
        }
    }
}

fn unexpected(command: Command, response: &Response) -> Error {
    Error::UnexpectedResponse {
        command,
        response: response.code(),
    }
}
