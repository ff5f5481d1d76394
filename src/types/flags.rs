// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Block record flag set.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[serde(transparent)]
    pub struct BlockFlags: u32 {
        const MAIN = 0x01;
        const MAIN_CHAIN = 0x02;
        const APPLIED = 0x04;
        const MAIN_REF = 0x08;
        const REF = 0x10;
        /// Owned by one of the local keys.
        const OURS = 0x20;
        const EXTRA = 0x40;
        const REMARK = 0x80;
    }
}

impl BlockFlags {
    pub fn is_ours(self) -> bool {
        self.contains(Self::OURS)
    }

    pub fn is_main(self) -> bool {
        self.contains(Self::MAIN)
    }

    pub fn has_remark(self) -> bool {
        self.contains(Self::REMARK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::types::BlockRecord;

    #[test]
    fn test_remove_ours_keeps_other_bits() {
        let mut flags = BlockFlags::MAIN | BlockFlags::OURS | BlockFlags::REMARK;
        flags.remove(BlockFlags::OURS);

        assert!(!flags.is_ours());
        assert!(flags.is_main());
        assert!(flags.has_remark());
        assert_eq!(flags.bits(), 0x81);
    }

    #[test]
    fn test_set_toggles_single_bit() {
        let mut flags = BlockFlags::from_bits_retain(0x04);
        flags.set(BlockFlags::OURS, true);
        assert_eq!(flags.bits(), 0x24);
        flags.set(BlockFlags::OURS, false);
        assert_eq!(flags, BlockFlags::APPLIED);
    }

    #[test]
    fn test_unknown_bits_survive_record_codec() {
        let mut record = BlockRecord::default();
        record.flags = BlockFlags::from_bits_retain(0x0100 | 0x81);
        record.mark_snapshot();

        let decoded: BlockRecord = codec::deserialize(&codec::serialize(&record).unwrap()).unwrap();
        assert_eq!(decoded.flags.bits(), 0x0181);
        assert!(decoded.flags.is_main());
        assert!(!decoded.flags.is_ours());
    }
}
