use crate::{ButtonError, Command, Result};
use bytes::BytesMut;
use tokio_util::codec::Encoder;

/// Frames commands for a `FramedWrite`. One command is one byte, so there
/// is nothing to decode and no delimiter to add.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct ButtonCodec(());

impl ButtonCodec {
    #[must_use]
    pub const fn new() -> Self {
        Self(())
    }
}

impl Encoder<Command> for ButtonCodec {
    type Error = ButtonError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(&[item.to_u8()]);
        Ok(())
    }
}
