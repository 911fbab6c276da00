//! Address families, bit extraction, and parsing of textual prefixes.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use either::Either;
use ipnet::IpNet;
use num_traits::{CheckedShr, PrimInt, Unsigned, Zero};

use crate::{Error, Result};

/// The address family of a prefix or an address. Every node in the trie keeps one payload slot
/// per family, so IPv4 and IPv6 prefixes never collide, even if their bit paths are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// IPv4, 32 bits.
    V4,
    /// IPv6, 128 bits.
    V6,
}

impl Family {
    /// The family of an address.
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }

    /// The family of a prefix.
    pub fn of_net(prefix: &IpNet) -> Self {
        match prefix {
            IpNet::V4(_) => Family::V4,
            IpNet::V6(_) => Family::V6,
        }
    }

    /// Natural width of addresses in this family (32 or 128).
    pub fn width(self) -> u8 {
        match self {
            Family::V4 => Ipv4Addr::WIDTH,
            Family::V6 => Ipv6Addr::WIDTH,
        }
    }
}

/// Trait describing the raw address of a single family.
pub trait AddressFamily: Copy {
    /// How the address is represented. This must be `u32` or `u128`.
    type R: Unsigned + PrimInt + Zero + CheckedShr;

    /// The family tag of this address type.
    const FAMILY: Family;

    /// Number of bits in an address.
    const WIDTH: u8;

    /// Get the raw (host-order) representation of the address.
    fn repr(&self) -> Self::R;

    /// Create an address from its raw representation. This is the inverse of
    /// [`AddressFamily::repr`], allowing callers generic over the family to build addresses from
    /// integers.
    ///
    /// ```
    /// # use netmask_trie::AddressFamily;
    /// # use std::net::{Ipv4Addr, Ipv6Addr};
    /// use num_traits::One;
    ///
    /// fn set_last_bit<A: AddressFamily>(addr: A) -> A {
    ///     A::from_repr(addr.repr() | A::R::one())
    /// }
    /// assert_eq!(set_last_bit(Ipv4Addr::new(10, 0, 0, 0)), Ipv4Addr::new(10, 0, 0, 1));
    /// assert_eq!(set_last_bit(Ipv6Addr::UNSPECIFIED), Ipv6Addr::LOCALHOST);
    /// ```
    fn from_repr(repr: Self::R) -> Self;

    /// Check if a specific bit is set (counted from the left, where 0 is the first bit from the
    /// left). Bits past the width are never set.
    fn is_bit_set(&self, bit: u8) -> bool {
        let mask = (!Self::R::zero())
            .checked_shr(bit as u32)
            .unwrap_or_else(Self::R::zero)
            ^ (!Self::R::zero())
                .checked_shr(1u32 + bit as u32)
                .unwrap_or_else(Self::R::zero);
        mask & self.repr() != Self::R::zero()
    }

    /// Iterate over the first `len` bits of the address, most significant first. `len` is clamped
    /// to the width of the family.
    fn bits(self, len: u8) -> Bits<Self> {
        Bits {
            addr: self,
            pos: 0,
            len: len.min(Self::WIDTH),
        }
    }
}

impl AddressFamily for Ipv4Addr {
    type R = u32;
    const FAMILY: Family = Family::V4;
    const WIDTH: u8 = 32;

    fn repr(&self) -> u32 {
        (*self).into()
    }

    fn from_repr(repr: u32) -> Self {
        repr.into()
    }
}

impl AddressFamily for Ipv6Addr {
    type R = u128;
    const FAMILY: Family = Family::V6;
    const WIDTH: u8 = 128;

    fn repr(&self) -> u128 {
        (*self).into()
    }

    fn from_repr(repr: u128) -> Self {
        repr.into()
    }
}

/// Iterator over the leading bits of an address. `true` means the bit is set, i.e., the walk
/// takes the right branch.
#[derive(Debug, Clone)]
pub struct Bits<A> {
    addr: A,
    pos: u8,
    len: u8,
}

impl<A: AddressFamily> Iterator for Bits<A> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.pos >= self.len {
            return None;
        }
        let bit = self.addr.is_bit_set(self.pos);
        self.pos += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = (self.len - self.pos) as usize;
        (rem, Some(rem))
    }
}

impl<A: AddressFamily> ExactSizeIterator for Bits<A> {}

/// Bit path of an address of either family.
pub type Path = Either<Bits<Ipv4Addr>, Bits<Ipv6Addr>>;

/// The path through the trie for the first `len` bits of `addr`. The family is dispatched once
/// here, so the walks in the trie do not need to care about the width.
pub fn path(addr: &IpAddr, len: u8) -> Path {
    match addr {
        IpAddr::V4(a) => Either::Left(a.bits(len)),
        IpAddr::V6(a) => Either::Right(a.bits(len)),
    }
}

/// The path through the trie that ends at the node of `prefix`.
pub fn prefix_path(prefix: &IpNet) -> Path {
    path(&prefix.network(), prefix.prefix_len())
}

/// Parse a prefix from its textual form (`192.0.2.0/24`, `2001:db8::/32`). An address without
/// `/bits` is a host prefix. Host bits are cleared.
///
/// ```
/// # use netmask_trie::parse_prefix;
/// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
/// assert_eq!(parse_prefix("10.1.2.3/8")?, "10.0.0.0/8".parse()?);
/// assert_eq!(parse_prefix("10.1.2.3")?, "10.1.2.3/32".parse()?);
/// assert_eq!(parse_prefix("2001:db8::1")?, "2001:db8::1/128".parse()?);
/// assert!(parse_prefix("10.0.0.0/33").is_err());
/// # Ok(())
/// # }
/// ```
pub fn parse_prefix(text: &str) -> Result<IpNet> {
    let prefix = if text.contains('/') {
        text.parse::<IpNet>()
            .map_err(|_| Error::InvalidPrefix(text.to_string()))?
    } else {
        let addr = parse_addr(text).map_err(|_| Error::InvalidPrefix(text.to_string()))?;
        IpNet::new(addr, Family::of(&addr).width())
            .map_err(|_| Error::InvalidPrefix(text.to_string()))?
    };
    Ok(prefix.trunc())
}

/// Parse a single address (dotted-quad or colon-hex).
pub fn parse_addr(text: &str) -> Result<IpAddr> {
    text.parse()
        .map_err(|_| Error::InvalidAddress(text.to_string()))
}
