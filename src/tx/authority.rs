//! Read and write authorities derived from a chain signing key
//!
//! Every backend implements `Authority`. The rest of the relayer only handles
//! `ReadAuthority` (an address plus a query scope) and `WriteAuthority`
//! (an address, a gas ceiling and a guarded signing operation), so backends
//! with different signature schemes can be swapped at construction time.

use crate::chain::QueryScope;
use crate::error::{RelayerError, RelayerResult};
use crate::metrics;

use std::fmt;
use tracing::{debug, error};

/// Proof that `WriteAuthority::sign` matched the requested address against
/// the authority's own. Only this module can construct one, so the backend
/// signing hook cannot be reached from outside the crate.
///
/// ```compile_fail
/// use handshake_relayer::tx::authority::AddressChecked;
///
/// let _token = AddressChecked { _private: () };
/// ```
#[derive(Debug)]
pub struct AddressChecked {
    _private: (),
}

/// Signing key material for one chain
pub trait Authority: Send + Sync {
    type Address: Copy + Eq + fmt::Debug + Send + Sync;
    type UnsignedTx;
    type SignedTx;

    /// Chain the key signs for
    fn chain_id(&self) -> &str;

    /// Address derived from the held key
    fn address(&self) -> Self::Address;

    /// Gas ceiling attached to write authorities
    fn gas_limit(&self) -> u64;

    /// Backend signing hook: compute the canonical digest for this chain and
    /// sign it. Callers go through `WriteAuthority::sign`, which performs the
    /// address check and hands over the token.
    #[doc(hidden)]
    fn sign_unchecked(
        &self,
        tx: &Self::UnsignedTx,
        checked: AddressChecked,
    ) -> RelayerResult<Self::SignedTx>;

    fn read_authority(&self, scope: QueryScope) -> ReadAuthority<Self::Address> {
        ReadAuthority {
            from: self.address(),
            scope,
        }
    }

    fn write_authority(&self, scope: QueryScope) -> WriteAuthority<'_, Self> {
        WriteAuthority {
            from: self.address(),
            gas_limit: self.gas_limit(),
            scope,
            authority: self,
        }
    }
}

/// Identity used for read-only calls that depend on the caller address
#[derive(Debug, Clone)]
pub struct ReadAuthority<Addr> {
    pub from: Addr,
    pub scope: QueryScope,
}

/// Permission to sign transactions for exactly one address
pub struct WriteAuthority<'a, A: Authority + ?Sized> {
    pub from: A::Address,
    pub gas_limit: u64,
    pub scope: QueryScope,
    authority: &'a A,
}

impl<'a, A: Authority + ?Sized> WriteAuthority<'a, A> {
    /// Sign `tx` on behalf of `address`. The given transaction is left as is;
    /// the signed result is a new value.
    pub fn sign(&self, address: A::Address, tx: &A::UnsignedTx) -> RelayerResult<A::SignedTx> {
        let chain_id = self.authority.chain_id();

        if address != self.from {
            error!(
                "Refusing to sign for {:?} on chain {}: authority holds {:?}",
                address, chain_id, self.from
            );
            metrics::record_signing_failure(chain_id, "unauthorized");
            return Err(RelayerError::UnauthorizedSigner {
                expected: format!("{:?}", self.from),
                requested: format!("{:?}", address),
            });
        }

        match self
            .authority
            .sign_unchecked(tx, AddressChecked { _private: () })
        {
            Ok(signed) => {
                debug!("Signed transaction for {:?} on chain {}", address, chain_id);
                metrics::record_signature(chain_id);
                Ok(signed)
            }
            Err(e) => {
                error!("Failed to sign transaction on chain {}: {}", chain_id, e);
                metrics::record_signing_failure(chain_id, "signer");
                Err(e)
            }
        }
    }
}

impl<A: Authority + ?Sized> fmt::Debug for WriteAuthority<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteAuthority")
            .field("from", &self.from)
            .field("gas_limit", &self.gas_limit)
            .field("chain_id", &self.authority.chain_id())
            .finish()
    }
}
