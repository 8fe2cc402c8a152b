//! # Zarya Contract Surface
//!
//! Typed wrappers for the seven read functions the synchronizer needs. The
//! names, parameter types and return shapes are fixed by the deployed
//! contract and must not change.
//!
//! | Function | Params | Returns |
//! |----------|--------|---------|
//! | `getTheme` | `bool, uint256` | `string` |
//! | `getStatement` | `bool, uint256` | `string` |
//! | `getNumericalCellInfo` | `uint256, uint256` | `bytes32, uint8, uint256` |
//! | `getNumericalHistory` | `uint256 x4` | `uint32[], address[], uint64[]` |
//! | `getCategoricalCellInfo` | `uint256, uint256` | `bytes32, uint64[], uint256` |
//! | `getCategoricalHistory` | `uint256 x4` | `uint32[], address[], uint64[]` |
//! | `getCategoryName` | `uint256, uint256, uint64` | `string` |

use std::sync::Arc;

use primitive_types::{H160, H256, U256};

use crate::domain::{AbiType, AbiValue, ContractError};
use crate::ports::inbound::shape_error;
use crate::ports::ContractReader;

/// Contract function names.
pub mod functions {
    pub const GET_THEME: &str = "getTheme";
    pub const GET_STATEMENT: &str = "getStatement";
    pub const GET_NUMERICAL_CELL_INFO: &str = "getNumericalCellInfo";
    pub const GET_NUMERICAL_HISTORY: &str = "getNumericalHistory";
    pub const GET_CATEGORICAL_CELL_INFO: &str = "getCategoricalCellInfo";
    pub const GET_CATEGORICAL_HISTORY: &str = "getCategoricalHistory";
    pub const GET_CATEGORY_NAME: &str = "getCategoryName";
}

/// Result of `getNumericalCellInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericalCellInfo {
    pub organ_hash: H256,
    pub decimals: u8,
    pub sample_count: U256,
}

/// Result of `getCategoricalCellInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalCellInfo {
    pub organ_hash: H256,
    pub allowed_category_ids: Vec<u64>,
    pub sample_count: U256,
}

/// Result of either history getter: three parallel sequences.
///
/// For categorical cells `values` holds category ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellHistory {
    pub timestamps: Vec<u32>,
    pub submitters: Vec<H160>,
    pub values: Vec<u64>,
}

/// Typed client for the Zarya contract.
#[derive(Clone)]
pub struct ZaryaContract {
    reader: Arc<dyn ContractReader>,
}

impl ZaryaContract {
    pub fn new(reader: Arc<dyn ContractReader>) -> Self {
        Self { reader }
    }

    /// Theme text at `(categorical, x)`; empty when the slot is unused.
    pub async fn theme(&self, categorical: bool, x: u64) -> Result<String, ContractError> {
        self.reader
            .call_string(
                functions::GET_THEME,
                &[AbiValue::Bool(categorical), AbiValue::uint256(x)],
            )
            .await
    }

    /// Statement text at `(categorical, y)`; empty when the slot is unused.
    pub async fn statement(&self, categorical: bool, y: u64) -> Result<String, ContractError> {
        self.reader
            .call_string(
                functions::GET_STATEMENT,
                &[AbiValue::Bool(categorical), AbiValue::uint256(y)],
            )
            .await
    }

    pub async fn numerical_cell_info(&self, x: u64, y: u64) -> Result<NumericalCellInfo, ContractError> {
        let function = functions::GET_NUMERICAL_CELL_INFO;
        let values = self
            .reader
            .call(
                function,
                &[AbiValue::uint256(x), AbiValue::uint256(y)],
                &[AbiType::Bytes32, AbiType::Uint(8), AbiType::Uint(256)],
            )
            .await?;

        match values.as_slice() {
            [organ, decimals, count] => {
                let shape = || shape_error(function, "(bytes32,uint8,uint256)", &values);
                Ok(NumericalCellInfo {
                    organ_hash: organ.as_bytes32().ok_or_else(shape)?,
                    decimals: decimals
                        .as_u64()
                        .and_then(|d| u8::try_from(d).ok())
                        .ok_or_else(shape)?,
                    sample_count: count.as_u256().ok_or_else(shape)?,
                })
            }
            _ => Err(shape_error(function, "(bytes32,uint8,uint256)", &values)),
        }
    }

    pub async fn numerical_history(
        &self,
        x: u64,
        y: u64,
        from: U256,
        count: U256,
    ) -> Result<CellHistory, ContractError> {
        self.history(functions::GET_NUMERICAL_HISTORY, x, y, from, count)
            .await
    }

    pub async fn categorical_cell_info(&self, x: u64, y: u64) -> Result<CategoricalCellInfo, ContractError> {
        let function = functions::GET_CATEGORICAL_CELL_INFO;
        let values = self
            .reader
            .call(
                function,
                &[AbiValue::uint256(x), AbiValue::uint256(y)],
                &[
                    AbiType::Bytes32,
                    AbiType::array_of(AbiType::Uint(64)),
                    AbiType::Uint(256),
                ],
            )
            .await?;

        match values.as_slice() {
            [organ, allowed, count] => {
                let shape = || shape_error(function, "(bytes32,uint64[],uint256)", &values);
                Ok(CategoricalCellInfo {
                    organ_hash: organ.as_bytes32().ok_or_else(shape)?,
                    allowed_category_ids: collect(allowed, AbiValue::as_u64).ok_or_else(shape)?,
                    sample_count: count.as_u256().ok_or_else(shape)?,
                })
            }
            _ => Err(shape_error(function, "(bytes32,uint64[],uint256)", &values)),
        }
    }

    pub async fn categorical_history(
        &self,
        x: u64,
        y: u64,
        from: U256,
        count: U256,
    ) -> Result<CellHistory, ContractError> {
        self.history(functions::GET_CATEGORICAL_HISTORY, x, y, from, count)
            .await
    }

    /// Name of `category_id` in the cell at `(x, y)`.
    pub async fn category_name(&self, x: u64, y: u64, category_id: u64) -> Result<String, ContractError> {
        self.reader
            .call_string(
                functions::GET_CATEGORY_NAME,
                &[
                    AbiValue::uint256(x),
                    AbiValue::uint256(y),
                    AbiValue::uint64(category_id),
                ],
            )
            .await
    }

    async fn history(
        &self,
        function: &str,
        x: u64,
        y: u64,
        from: U256,
        count: U256,
    ) -> Result<CellHistory, ContractError> {
        let values = self
            .reader
            .call(
                function,
                &[
                    AbiValue::uint256(x),
                    AbiValue::uint256(y),
                    AbiValue::uint256(from),
                    AbiValue::uint256(count),
                ],
                &[
                    AbiType::array_of(AbiType::Uint(32)),
                    AbiType::array_of(AbiType::Address),
                    AbiType::array_of(AbiType::Uint(64)),
                ],
            )
            .await?;

        let expected = "(uint32[],address[],uint64[])";
        match values.as_slice() {
            [timestamps, submitters, raw] => {
                let shape = || shape_error(function, expected, &values);
                Ok(CellHistory {
                    timestamps: collect(timestamps, |v| v.as_u64().and_then(|t| u32::try_from(t).ok()))
                        .ok_or_else(shape)?,
                    submitters: collect(submitters, AbiValue::as_address).ok_or_else(shape)?,
                    values: collect(raw, AbiValue::as_u64).ok_or_else(shape)?,
                })
            }
            _ => Err(shape_error(function, expected, &values)),
        }
    }
}

fn collect<T>(array: &AbiValue, f: impl Fn(&AbiValue) -> Option<T>) -> Option<Vec<T>> {
    array.as_array()?.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Reader that replies with a fixed value list and records calls.
    struct FixedReader {
        reply: Vec<AbiValue>,
        calls: Mutex<Vec<(String, Vec<AbiValue>)>>,
    }

    impl FixedReader {
        fn new(reply: Vec<AbiValue>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ContractReader for FixedReader {
        async fn call(
            &self,
            function: &str,
            inputs: &[AbiValue],
            _outputs: &[AbiType],
        ) -> Result<Vec<AbiValue>, ContractError> {
            self.calls.lock().push((function.to_owned(), inputs.to_vec()));
            Ok(self.reply.clone())
        }
    }

    fn u64_array(bits: usize, items: &[u64]) -> AbiValue {
        AbiValue::Array(
            AbiType::Uint(bits),
            items.iter().map(|v| AbiValue::Uint(U256::from(*v), bits)).collect(),
        )
    }

    #[tokio::test]
    async fn test_theme_passes_flag_and_index() {
        let reader = FixedReader::new(vec![AbiValue::String("Economy".into())]);
        let contract = ZaryaContract::new(reader.clone());

        assert_eq!(contract.theme(true, 3).await.unwrap(), "Economy");
        let calls = reader.calls.lock();
        assert_eq!(calls[0].0, "getTheme");
        assert_eq!(calls[0].1, vec![AbiValue::Bool(true), AbiValue::uint256(3u64)]);
    }

    #[tokio::test]
    async fn test_numerical_cell_info() {
        let organ = H256::repeat_byte(7);
        let reader = FixedReader::new(vec![
            AbiValue::Bytes32(organ),
            AbiValue::Uint(U256::from(2u64), 8),
            AbiValue::uint256(5u64),
        ]);
        let info = ZaryaContract::new(reader).numerical_cell_info(0, 1).await.unwrap();

        assert_eq!(
            info,
            NumericalCellInfo {
                organ_hash: organ,
                decimals: 2,
                sample_count: U256::from(5u64),
            }
        );
    }

    #[tokio::test]
    async fn test_categorical_cell_info() {
        let reader = FixedReader::new(vec![
            AbiValue::Bytes32(H256::zero()),
            u64_array(64, &[1, 2, 3]),
            AbiValue::uint256(0u64),
        ]);
        let info = ZaryaContract::new(reader).categorical_cell_info(4, 4).await.unwrap();
        assert_eq!(info.allowed_category_ids, vec![1, 2, 3]);
        assert!(info.sample_count.is_zero());
    }

    #[tokio::test]
    async fn test_history_keeps_parallel_sequences() {
        let reader = FixedReader::new(vec![
            u64_array(32, &[10, 20]),
            AbiValue::Array(
                AbiType::Address,
                vec![AbiValue::Address(H160::zero()), AbiValue::Address(H160::repeat_byte(1))],
            ),
            u64_array(64, &[7500, 8000]),
        ]);
        let contract = ZaryaContract::new(reader.clone());
        let history = contract
            .numerical_history(0, 0, U256::zero(), U256::from(2u64))
            .await
            .unwrap();

        assert_eq!(history.timestamps, vec![10, 20]);
        assert_eq!(history.values, vec![7500, 8000]);
        assert_eq!(reader.calls.lock()[0].1.len(), 4);
    }

    #[tokio::test]
    async fn test_category_name_uses_uint64_id() {
        let reader = FixedReader::new(vec![AbiValue::String("Yes".into())]);
        let contract = ZaryaContract::new(reader.clone());
        assert_eq!(contract.category_name(1, 2, 3).await.unwrap(), "Yes");
        assert_eq!(reader.calls.lock()[0].1[2], AbiValue::uint64(3));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_decode_error() {
        let reader = FixedReader::new(vec![AbiValue::String("oops".into())]);
        let err = ZaryaContract::new(reader)
            .numerical_cell_info(0, 0)
            .await
            .unwrap_err();
        assert!(err.is_decode_error());
    }
}
