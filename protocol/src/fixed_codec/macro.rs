macro_rules! impl_default_fixed_codec_for {
    ($category:ident, [$($type:ident),+]) => (
        $(
            impl crate::fixed_codec::FixedCodec for crate::types::$category::$type {
                fn encode_fixed(&self) -> crate::ProtocolResult<bytes::Bytes> {
                    Ok(bytes::Bytes::from(rlp::encode(self).to_vec()))
                }

                fn decode_fixed(bytes: bytes::Bytes) -> crate::ProtocolResult<Self> {
                    Ok(rlp::decode(&bytes).map_err(crate::fixed_codec::FixedCodecError::Decoder)?)
                }
            }
        )+
    )
}
