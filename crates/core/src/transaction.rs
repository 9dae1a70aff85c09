//! Transaction model, canonical wire encoding, and derived digests.
//!
//! The wire layout commits to field order: version, flags, inputs, outputs.
//! Reordering any sequence changes the encoding and therefore every digest
//! derived from it. Decoding is strict: any short read or malformed field
//! propagates an error and never yields a partially populated value.

use crate::codec::{
    read_hash, read_u32, read_u64, read_varbytes, read_varint, read_varstring, write_hash,
    write_u32, write_u64, write_varbytes, write_varint, write_varstring, CodecError,
};
use crate::hash::{sha256d, Hash};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// Identifies one output of a prior transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outpoint {
    /// Id of the transaction that created the output.
    pub previous_tx: Hash,
    /// Index of the output within that transaction.
    pub index: u32,
}

impl Outpoint {
    pub fn new(previous_tx: Hash, index: u32) -> Self {
        Self { previous_tx, index }
    }

    /// Write the outpoint: 32-byte hash, then u32 index.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<(), CodecError> {
        write_hash(writer, &self.previous_tx)?;
        write_u32(writer, self.index)
    }

    /// Read an outpoint.
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self, CodecError> {
        let previous_tx = read_hash(reader)?;
        let index = read_u32(reader)?;
        Ok(Self { previous_tx, index })
    }
}

/// A transaction input spending one previous output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// The output being spent.
    pub previous_output: Outpoint,
    /// Script that satisfies the spent output's locking script. Opaque at
    /// this layer; interpreted by the script engine.
    pub unlocking_script: Vec<u8>,
}

impl TxIn {
    pub fn new(previous_output: Outpoint, unlocking_script: Vec<u8>) -> Self {
        Self {
            previous_output,
            unlocking_script,
        }
    }

    /// Write the input: outpoint, then length-prefixed script.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<(), CodecError> {
        self.previous_output.encode(writer)?;
        write_varbytes(writer, &self.unlocking_script)
    }

    /// Read an input.
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self, CodecError> {
        let previous_output = Outpoint::decode(reader)?;
        let unlocking_script = read_varbytes(reader)?;
        Ok(Self {
            previous_output,
            unlocking_script,
        })
    }
}

/// A transaction output: an amount locked behind a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Amount carried by this output.
    pub value: u64,
    /// Script that must be satisfied to spend this output.
    pub locking_script: Vec<u8>,
}

impl TxOut {
    pub fn new(value: u64, locking_script: Vec<u8>) -> Self {
        Self {
            value,
            locking_script,
        }
    }

    /// Write the output: u64 value, then length-prefixed script.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<(), CodecError> {
        write_u64(writer, self.value)?;
        write_varbytes(writer, &self.locking_script)
    }

    /// Read an output.
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self, CodecError> {
        let value = read_u64(reader)?;
        let locking_script = read_varbytes(reader)?;
        Ok(Self {
            value,
            locking_script,
        })
    }
}

impl fmt::Display for TxOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TxOut[value: {}, script: {}]",
            self.value,
            hex::encode(&self.locking_script)
        )
    }
}

/// A transaction: versioned flags, inputs, and outputs.
///
/// Plain value data with no internal caching; callers recompute digests
/// after any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Format version.
    pub version: u32,
    /// Ordered feature flags, each a UTF-8 string.
    pub flags: Vec<String>,
    /// Ordered inputs.
    pub inputs: Vec<TxIn>,
    /// Ordered outputs.
    pub outputs: Vec<TxOut>,
}

impl Transaction {
    pub fn new(version: u32, flags: Vec<String>, inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> Self {
        Self {
            version,
            flags,
            inputs,
            outputs,
        }
    }

    /// Write the canonical encoding. Fails only if the sink fails.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<(), CodecError> {
        write_u32(writer, self.version)?;

        write_varint(writer, self.flags.len() as u64)?;
        for flag in &self.flags {
            write_varstring(writer, flag)?;
        }

        write_varint(writer, self.inputs.len() as u64)?;
        for input in &self.inputs {
            input.encode(writer)?;
        }

        write_varint(writer, self.outputs.len() as u64)?;
        for output in &self.outputs {
            output.encode(writer)?;
        }

        Ok(())
    }

    /// Read a transaction, consuming fields in canonical order. Every
    /// sub-read failure propagates; a partially parsed transaction is
    /// never returned.
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self, CodecError> {
        let version = read_u32(reader)?;

        let flag_count = read_varint(reader)?;
        let mut flags = Vec::new();
        for _ in 0..flag_count {
            flags.push(read_varstring(reader)?);
        }

        let input_count = read_varint(reader)?;
        let mut inputs = Vec::new();
        for _ in 0..input_count {
            inputs.push(TxIn::decode(reader)?);
        }

        let output_count = read_varint(reader)?;
        let mut outputs = Vec::new();
        for _ in 0..output_count {
            outputs.push(TxOut::decode(reader)?);
        }

        Ok(Self {
            version,
            flags,
            inputs,
            outputs,
        })
    }

    /// Canonical encoding as an owned byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf)
            .expect("writing to a Vec cannot fail");
        buf
    }

    /// Decode a transaction from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::decode(&mut &bytes[..])
    }

    /// The transaction id: double SHA-256 of the canonical encoding.
    pub fn txid(&self) -> Hash {
        sha256d(&self.to_bytes())
    }

    /// The digest a signer signs to authorize spending `spent_value` through
    /// `input`.
    ///
    /// Binds the signature to the version, the flags, the full set of
    /// consumed outpoints, the exact outpoint being spent and its value, and
    /// the full set of outputs. Unlocking scripts are deliberately excluded,
    /// since they carry the signatures themselves.
    pub fn signing_digest(&self, input: &TxIn, spent_value: u64) -> Hash {
        let buf = self
            .signing_payload(input, spent_value)
            .expect("writing to a Vec cannot fail");
        sha256d(&buf)
    }

    fn signing_payload(&self, input: &TxIn, spent_value: u64) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();

        write_u32(&mut buf, self.version)?;
        write_varint(&mut buf, self.flags.len() as u64)?;
        for flag in &self.flags {
            write_varstring(&mut buf, flag)?;
        }

        let mut outpoints = Vec::new();
        for txin in &self.inputs {
            txin.previous_output.encode(&mut outpoints)?;
        }
        buf.extend_from_slice(sha256d(&outpoints).as_ref());

        input.previous_output.encode(&mut buf)?;
        write_u64(&mut buf, spent_value)?;

        let mut outputs = Vec::new();
        for txout in &self.outputs {
            txout.encode(&mut outputs)?;
        }
        buf.extend_from_slice(sha256d(&outputs).as_ref());

        Ok(buf)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction[version: {}, flags: {:?}, inputs: {}, outputs: {}]",
            self.version,
            self.flags,
            self.inputs.len(),
            self.outputs.len()
        )
    }
}
