//! Description of the generic type `Prefix`.

#[cfg(feature = "cidr")]
use cidr::{IpCidr, Ipv4Cidr, Ipv6Cidr};
#[cfg(any(feature = "ipnet", feature = "ipnetwork", feature = "cidr"))]
use either::Either;
#[cfg(feature = "ipnet")]
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
#[cfg(feature = "ipnetwork")]
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use num_traits::{ToBytes, Unsigned};

/// Trait for typed prefixes that can be stored in a [`crate::Tree`].
///
/// A prefix is described by the bytes of its address (most significant byte first) and the
/// number of leading bits that are significant. Bits past `prefix_len` are ignored by the tree,
/// so implementations need not mask them.
pub trait Prefix {
    /// Byte representation of the address.
    type Octets: AsRef<[u8]>;

    /// Address bytes, most significant byte first.
    fn octets(&self) -> Self::Octets;

    /// Prefix length in bits.
    fn prefix_len(&self) -> u8;
}

#[cfg(feature = "ipnet")]
impl Prefix for Ipv4Net {
    type Octets = [u8; 4];

    fn octets(&self) -> [u8; 4] {
        self.network().octets()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }
}

#[cfg(feature = "ipnet")]
impl Prefix for Ipv6Net {
    type Octets = [u8; 16];

    fn octets(&self) -> [u8; 16] {
        self.network().octets()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }
}

/// IPv4 and IPv6 prefixes of an [`IpNet`] only make sense in separate trees, since an IPv4
/// prefix of length 8 and an IPv6 prefix of length 8 share the same bit positions.
#[cfg(feature = "ipnet")]
impl Prefix for IpNet {
    type Octets = Either<[u8; 4], [u8; 16]>;

    fn octets(&self) -> Self::Octets {
        match self {
            IpNet::V4(net) => Either::Left(Prefix::octets(net)),
            IpNet::V6(net) => Either::Right(Prefix::octets(net)),
        }
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }
}

#[cfg(feature = "ipnetwork")]
impl Prefix for Ipv4Network {
    type Octets = [u8; 4];

    fn octets(&self) -> [u8; 4] {
        self.network().octets()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }
}

#[cfg(feature = "ipnetwork")]
impl Prefix for Ipv6Network {
    type Octets = [u8; 16];

    fn octets(&self) -> [u8; 16] {
        self.network().octets()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }
}

#[cfg(feature = "ipnetwork")]
impl Prefix for IpNetwork {
    type Octets = Either<[u8; 4], [u8; 16]>;

    fn octets(&self) -> Self::Octets {
        match self {
            IpNetwork::V4(net) => Either::Left(Prefix::octets(net)),
            IpNetwork::V6(net) => Either::Right(Prefix::octets(net)),
        }
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }
}

#[cfg(feature = "cidr")]
impl Prefix for Ipv4Cidr {
    type Octets = [u8; 4];

    fn octets(&self) -> [u8; 4] {
        self.first_address().octets()
    }

    fn prefix_len(&self) -> u8 {
        self.network_length()
    }
}

#[cfg(feature = "cidr")]
impl Prefix for Ipv6Cidr {
    type Octets = [u8; 16];

    fn octets(&self) -> [u8; 16] {
        self.first_address().octets()
    }

    fn prefix_len(&self) -> u8 {
        self.network_length()
    }
}

#[cfg(feature = "cidr")]
impl Prefix for IpCidr {
    type Octets = Either<[u8; 4], [u8; 16]>;

    fn octets(&self) -> Self::Octets {
        match self {
            IpCidr::V4(cidr) => Either::Left(Prefix::octets(cidr)),
            IpCidr::V6(cidr) => Either::Right(Prefix::octets(cidr)),
        }
    }

    fn prefix_len(&self) -> u8 {
        self.network_length()
    }
}

/// Any unsigned integer together with a prefix length, e.g. `(0x0a000000u32, 8)` for
/// `10.0.0.0/8`. The integer is read in big-endian order.
impl<R> Prefix for (R, u8)
where
    R: Unsigned + ToBytes,
{
    type Octets = R::Bytes;

    fn octets(&self) -> R::Bytes {
        self.0.to_be_bytes()
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }
}
