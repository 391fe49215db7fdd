use std::net::{Ipv4Addr, SocketAddrV4, TcpListener, TcpStream};
use std::os::fd::{AsFd, AsRawFd, OwnedFd};
use std::time::Duration;
use nix::errno::Errno;
use nix::sys::socket::sockopt::{ReceiveTimeout, ReuseAddr};
use nix::sys::socket::{bind, listen, setsockopt, socket, AddressFamily, Backlog, SockFlag, SockType, SockaddrIn};
use nix::sys::time::{TimeVal, TimeValLike};
use tracing::debug;

/// Bind a TCP listener on all interfaces with room for a single pending connection.
pub fn new_listener(port: u16) -> Result<TcpListener, Errno> {
    let sock_fd: OwnedFd = socket(AddressFamily::Inet, SockType::Stream, SockFlag::empty(), None)?;
    setsockopt(&sock_fd, ReuseAddr, &true)?;

    let addr = SockaddrIn::from(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
    bind(sock_fd.as_raw_fd(), &addr)?;
    listen(&sock_fd, Backlog::new(1)?)?;

    debug!(port, "listening");
    Ok(TcpListener::from(sock_fd))
}

/// Connect to `host:port`.
pub fn connect(host: Ipv4Addr, port: u16) -> std::io::Result<TcpStream> {
    let stream = TcpStream::connect(SocketAddrV4::new(host, port))?;
    stream.set_nodelay(true)?;
    debug!(%host, port, "connected");
    Ok(stream)
}

/// Bound every blocking read on `fd`. A receive that runs out reports `EAGAIN`.
///
/// A zero `SO_RCVTIMEO` means "wait forever" to the kernel, so `Duration::ZERO` is
/// rejected with `EINVAL` and anything shorter than a microsecond rounds up to one.
pub fn set_timeout<F: AsFd>(fd: &F, duration: Duration) -> Result<(), Errno> {
    if duration.is_zero() {
        return Err(Errno::EINVAL);
    }
    let micros = duration.as_micros().max(1).min(i64::MAX as u128) as i64;
    setsockopt(fd, ReceiveTimeout, &TimeVal::microseconds(micros))?;
    Ok(())
}
