use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::float::Float;
use crate::opcode::OpCode;

use super::Tape;

impl<F: Float + Serialize> Serialize for Tape<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.atomics.is_empty() {
            return Err(serde::ser::Error::custom(
                "cannot serialize a Tape that calls atomic operators; \
                 atomic operators must be re-registered after deserialization",
            ));
        }
        let mut s = serializer.serialize_struct("Tape", 8)?;
        s.serialize_field("ops", &self.ops)?;
        s.serialize_field("arg_start", &self.arg_start)?;
        s.serialize_field("args", &self.args)?;
        s.serialize_field("result_vars", &self.result_vars)?;
        s.serialize_field("parameters", &self.parameters)?;
        s.serialize_field("num_independent", &self.num_independent)?;
        s.serialize_field("num_variables", &self.num_variables)?;
        s.serialize_field("num_load_ops", &self.num_load_ops)?;
        s.end()
    }
}

impl<'de, F: Float + Deserialize<'de>> Deserialize<'de> for Tape<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct TapeData<F> {
            ops: Vec<OpCode>,
            arg_start: Vec<u32>,
            args: Vec<u32>,
            result_vars: Vec<u32>,
            parameters: Vec<F>,
            num_independent: u32,
            num_variables: u32,
            #[serde(default)]
            num_load_ops: u32,
        }

        let data = TapeData::<F>::deserialize(deserializer)?;
        if data.arg_start.len() != data.ops.len() + 1
            || data.result_vars.len() != data.ops.len()
            || data.arg_start.last().map(|&e| e as usize) != Some(data.args.len())
        {
            return Err(serde::de::Error::custom("inconsistent tape instruction tables"));
        }
        if data.ops.first() != Some(&OpCode::Begin) {
            return Err(serde::de::Error::custom("tape does not start with Begin"));
        }
        if data.ops.iter().any(|op| *op == OpCode::User) {
            return Err(serde::de::Error::custom(
                "tape calls atomic operators that are not registered",
            ));
        }
        Ok(Tape {
            ops: data.ops,
            arg_start: data.arg_start,
            args: data.args,
            result_vars: data.result_vars,
            parameters: data.parameters,
            num_independent: data.num_independent,
            num_variables: data.num_variables,
            num_load_ops: data.num_load_ops,
            atomics: Vec::new(),
        })
    }
}
