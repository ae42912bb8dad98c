fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &byte| acc.wrapping_add(byte))
}

pub(crate) fn checksum(bytes: &[u8]) -> u8 {
    0u8.wrapping_sub(sum(bytes))
}

pub(crate) fn ones_complement(bytes: &[u8]) -> u8 {
    0xFFu8.wrapping_sub(sum(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intel_fields_sum_to_zero() {
        let fields = [0x02, 0x00, 0x00, 0x04, 0xAB, 0xCD];
        let cs = checksum(&fields);

        assert_eq!(cs, 0x82);
        assert_eq!(sum(&fields).wrapping_add(cs), 0);
    }

    #[test]
    fn motorola_fields_sum_to_ff() {
        let fields = [0x03, 0x00, 0x00];
        let cs = ones_complement(&fields);

        assert_eq!(cs, 0xFC);
        assert_eq!(sum(&fields).wrapping_add(cs), 0xFF);
    }
}
