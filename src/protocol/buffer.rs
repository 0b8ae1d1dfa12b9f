use crate::{core::error::PollError, protocol::types::DataSpace};

/// Storage for one poll result, shaped by the data space being read.
///
/// Bit spaces keep one byte per point (0 or 1), register spaces one `u16`
/// per point. The length is fixed at allocation and every cycle overwrites
/// the values in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleBuffer {
    Bits(Vec<u8>),
    Registers(Vec<u16>),
}

impl SampleBuffer {
    pub fn allocate(space: DataSpace, count: u16) -> Result<Self, PollError> {
        let count = count as usize;
        if space.is_bit_space() {
            let mut bits = Vec::new();
            bits.try_reserve_exact(count)
                .map_err(|_| PollError::Allocation { what: "bits" })?;
            bits.resize(count, 0u8);
            Ok(SampleBuffer::Bits(bits))
        } else {
            let mut registers = Vec::new();
            registers
                .try_reserve_exact(count)
                .map_err(|_| PollError::Allocation { what: "registers" })?;
            registers.resize(count, 0u16);
            Ok(SampleBuffer::Registers(registers))
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SampleBuffer::Bits(bits) => bits.len(),
            SampleBuffer::Registers(registers) => registers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Meaningful width of one element.
    pub fn element_bits(&self) -> u32 {
        match self {
            SampleBuffer::Bits(_) => 1,
            SampleBuffer::Registers(_) => 16,
        }
    }

    pub fn matches(&self, space: DataSpace) -> bool {
        matches!(
            (self, space.is_bit_space()),
            (SampleBuffer::Bits(_), true) | (SampleBuffer::Registers(_), false)
        )
    }

    pub fn value(&self, index: usize) -> Option<u16> {
        match self {
            SampleBuffer::Bits(bits) => bits.get(index).map(|b| *b as u16),
            SampleBuffer::Registers(registers) => registers.get(index).copied(),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.len()).filter_map(move |i| self.value(i))
    }

    /// Copy decoded coil/discrete states in, returning how many were stored.
    pub(crate) fn store_bits(&mut self, states: &[bool]) -> Option<usize> {
        let SampleBuffer::Bits(bits) = self else {
            return None;
        };
        let n = states.len().min(bits.len());
        for (slot, state) in bits.iter_mut().zip(states) {
            *slot = u8::from(*state);
        }
        Some(n)
    }

    pub(crate) fn store_registers(&mut self, values: &[u16]) -> Option<usize> {
        let SampleBuffer::Registers(registers) = self else {
            return None;
        };
        let n = values.len().min(registers.len());
        registers[..n].copy_from_slice(&values[..n]);
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_allocation_shape_follows_data_space() {
        for space in DataSpace::iter() {
            for count in [1u16, 2, 10, 125] {
                let buffer = SampleBuffer::allocate(space, count).unwrap();
                assert_eq!(buffer.len(), count as usize);
                assert!(buffer.matches(space));
                let expected_bits = if space.is_bit_space() { 1 } else { 16 };
                assert_eq!(buffer.element_bits(), expected_bits);
            }
        }
    }

    #[test]
    fn test_allocation_is_zeroed() {
        let buffer = SampleBuffer::allocate(DataSpace::HoldingRegisters, 8).unwrap();
        assert!(buffer.values().all(|v| v == 0));
        let buffer = SampleBuffer::allocate(DataSpace::Coils, 8).unwrap();
        assert!(buffer.values().all(|v| v == 0));
    }

    #[test]
    fn test_store_rejects_wrong_shape() {
        let mut bits = SampleBuffer::allocate(DataSpace::DiscreteInputs, 3).unwrap();
        assert_eq!(bits.store_registers(&[1, 2, 3]), None);
        assert_eq!(bits.store_bits(&[true, false, true]), Some(3));
        assert_eq!(bits.values().collect::<Vec<_>>(), vec![1, 0, 1]);

        let mut registers = SampleBuffer::allocate(DataSpace::InputRegisters, 2).unwrap();
        assert_eq!(registers.store_bits(&[true]), None);
        assert_eq!(registers.store_registers(&[0xFFFF, 7, 9]), Some(2));
        assert_eq!(registers.values().collect::<Vec<_>>(), vec![0xFFFF, 7]);
    }

    #[test]
    fn test_short_store_keeps_tail() {
        let mut registers = SampleBuffer::allocate(DataSpace::HoldingRegisters, 3).unwrap();
        registers.store_registers(&[5, 6, 7]);
        assert_eq!(registers.store_registers(&[1]), Some(1));
        assert_eq!(registers.values().collect::<Vec<_>>(), vec![1, 6, 7]);
    }
}
