use crate::error::FormatResult;
use crate::stream::{Deserialize, InputStream, OutputStream, Serialize, SizedVec};

/// Public key and signature block
///
/// Appears at the start of a signed manifest body and at the start of each
/// entry payload when per-file signatures are enabled. Both blobs carry a
/// `u32` length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSignature {
    /// Unused leading word
    pub reserved: u32,
    /// DER-encoded RSA public key
    pub public_key: Vec<u8>,
    /// RSA signature over the SHA-1 digest of the signed bytes
    pub signature: Vec<u8>,
}

impl Serialize for FileSignature {
    fn serialize(&self, stream: &mut OutputStream) -> FormatResult<()> {
        stream.write(&self.reserved)?;
        stream.write(&SizedVec::<u32, u8>::new(self.public_key.clone()))?;
        stream.write(&SizedVec::<u32, u8>::new(self.signature.clone()))
    }
}

impl Deserialize for FileSignature {
    fn deserialize(stream: &mut InputStream<'_>) -> FormatResult<Self> {
        let reserved = stream.read()?;
        let public_key = stream.read::<SizedVec<u32, u8>>()?.into_inner();
        let signature = stream.read::<SizedVec<u32, u8>>()?.into_inner();
        Ok(Self {
            reserved,
            public_key,
            signature,
        })
    }
}
