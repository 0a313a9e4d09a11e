//! Sentence pooling for BERT-style encoders.

use anyhow::{Result, ensure};
use candle_core::{D, DType, Tensor};

/// Average the token vectors selected by `attention_mask`: `[B,T,H]` x `[B,T]` -> `[B,H]`.
/// Rows with an all-zero mask come out as zeros.
pub fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    ensure!(hidden.rank() == 3, "hidden shape must be [B,T,H], got {:?}", hidden.dims());
    let (batch, tokens, _) = hidden.dims3()?;
    ensure!(attention_mask.dims() == [batch, tokens], "mask shape {:?} does not match hidden {:?}", attention_mask.dims(), hidden.dims());

    let weights = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&weights.unsqueeze(D::Minus1)?)?.sum(1)?;
    let counts = weights.sum_keepdim(1)?.maximum(1.0)?;
    Ok(summed.broadcast_div(&counts)?)
}

/// Scale each row of a `[B,H]` tensor to unit length.
pub fn l2_normalize(rows: &Tensor) -> Result<Tensor> {
    let eps = if rows.dtype() == DType::F16 { 1e-6 } else { 1e-12 };
    let norms = (rows.sqr()?.sum_keepdim(D::Minus1)?.sqrt()? + eps)?;
    Ok(rows.broadcast_div(&norms)?)
}

pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    l2_normalize(&mean_pool(hidden, attention_mask)?)
}
