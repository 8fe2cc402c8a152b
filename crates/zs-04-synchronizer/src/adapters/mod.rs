//! Adapters layer for the Synchronizer.

use primitive_types::H256;
use zs_02_organ_decoder::OrganDecoder;

use crate::ports::OrganNames;

impl OrganNames for OrganDecoder {
    fn organ_name(&self, raw_hash: &H256) -> String {
        self.decode(raw_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zs_02_organ_decoder::{organ_hash, DecoderConfig};

    #[test]
    fn test_decoder_serves_as_organ_names() {
        let decoder = OrganDecoder::build(&DecoderConfig { scan_organ_size: 1 }).unwrap();
        let names: &dyn OrganNames = &decoder;
        assert_eq!(names.organ_name(&organ_hash("77.0.КОН")), "77.0.КОН");
    }
}
