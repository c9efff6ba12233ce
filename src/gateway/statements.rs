//! SQL templates
//!
//! Every value reaches the database through a named placeholder.

pub const STUDENT_BY_USERNAME: &str = "SELECT * FROM ALUMNO WHERE USUARIO = :USUARIO";

pub const PROGRAM_BY_ID: &str = "SELECT * FROM REGISTRO_PROGRAMA WHERE ID_PROGRAMA = :PROGRAM_ID";

pub const DOCENT_BY_PROGRAM: &str = "SELECT * FROM DOCENTE WHERE ID_PROGRAMA = :PROGRAM_ID";

pub const UPDATE_STUDENT_IMAGE: &str = "
    UPDATE ALUMNO
    SET FOTO_ALUMNO = :STUDENT_PHOTO, ASISTENCIA = :ASSISTANCE
    WHERE ID_ALUMNO = :STUDENT_ID
";

pub const UPDATE_STUDENT_ASSISTANCE: &str = "
    UPDATE ALUMNO
    SET ASISTENCIA = :ASSISTANCE
    WHERE ID_ALUMNO = :STUDENT_ID
";

pub const INSERT_EVENT: &str = "
    INSERT INTO BITACORA_EVENTOS
    (ID_PROGRAMA, NOMBRE_ESTUDIANTE, APELLIDO_ESTUDIANTE, DESCRIPCION_EVENTO, HORA_EVENTO,
     CAPTURA_PRUEBA, ID_EVENTO, AVISO_USUARIO, ID_INSTITUCION)
    VALUES (:PROGRAM_ID, :STUDENT_NAME, :LASTNAME_STUDENT, :EVENT_DESCRIPTION, :TIME_EVENT,
            :CAPTURE_TEST, :ID_EVENT, :NOTICE_USER, :INSTITUTION_ID)
";

/// Programs of an institution whose date range contains `:fecha_actual`
pub const ACTIVE_PROGRAMS: &str = "
    SELECT ID_PROGRAMA, NOMBRE_PROGRAMA, DESCRIPCION_PROGRAMA, RESTRICCION_RESOLUCION
    FROM REGISTRO_PROGRAMA
    WHERE ID_INSTITUCION = :id_institucion
      AND :fecha_actual BETWEEN FECHA_INICIO AND FECHA_FIN
";

pub const PROGRAM_CONFIGURATION: &str = "
    SELECT TIPO_PROGRAMA, RETROCESO
    FROM PROGRAMA_CONFIGURACION
    WHERE ID_PROGRAMA = :id_programa
";

pub const QUESTIONS: &str = "
    SELECT ID_PROGRAMA_PREGUNTA, PREGUNTA_DESCRIPCION, TIPO_PREGUNTA, PREGUNTA_IMAGEN
    FROM PROGRAMA_PREGUNTAS
    WHERE ID_INSTITUCION = :id_institucion AND ID_PROGRAMA = :id_programa
";

pub const ANSWERS: &str = "
    SELECT ID_PROGRAMA_RESPUESTA, RESPUESTA
    FROM PROGRAMA_RESPUESTAS
    WHERE ID_INSTITUCION = :id_institucion
      AND ID_PROGRAMA = :id_programa
      AND ID_PROGRAMA_PREGUNTA = :id_pregunta
";

pub const INSERT_ANSWER: &str = "
    INSERT INTO SEL_PREGUNTA_UNICA_MULTIPLE (
        ID_INSTITUCION, ID_PROGRAMA, ID_ALUMNO, ID_PREGUNTA, TIPO_PREGUNTA,
        RESPUESTA, RESPUESTAS_MULTIPLES, PREGUNTA_DESCRIPCION,
        CALIFICACION_ALUMNO, CALIFICACION_PREGUNTA
    ) VALUES (
        :ID_INSTITUCION, :ID_PROGRAMA, :ID_ALUMNO, :ID_PREGUNTA, :TIPO_PREGUNTA,
        :RESPUESTA, :RESPUESTAS_MULTIPLES, :PREGUNTA_DESCRIPCION,
        :CALIFICACION_ALUMNO, :CALIFICACION_PREGUNTA
    )
";

/// Connectivity check
pub const PING: &str = "SELECT 1";
